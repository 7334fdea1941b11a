//! Calling-convention extraction of the intercepted call's second argument.
//!
//! An entry probe observes the target function at its first instruction and
//! captures a [`RegisterSnapshot`]: the integer argument registers, the
//! stack pointer, and a bounded copy of the stack at entry. Where the
//! second argument actually lives depends on the build target's ABI, and
//! that knowledge is isolated here in [`scancode_from_entry`] — adding an
//! architecture touches this one function and nothing in the attach or
//! fallback logic.

use thiserror::Error;

/// Number of stack bytes a backend captures at function entry.
pub const STACK_WINDOW: usize = 24;

/// Register and stack state captured at the probed function's entry.
#[derive(Debug, Clone, Copy)]
pub struct RegisterSnapshot {
    /// Integer argument registers in ABI order (x86-64: RDI, RSI, RDX, RCX,
    /// R8, R9; aarch64: X0–X5). Zeroed on targets that pass arguments on
    /// the stack.
    pub arg_regs: [u64; 6],
    /// Stack pointer at function entry.
    pub sp: u64,
    /// Copy of the first bytes at the stack pointer.
    pub stack: [u8; STACK_WINDOW],
    /// How many bytes of `stack` the backend actually captured (a capture
    /// near a stack page boundary may be short).
    pub stack_len: usize,
}

impl RegisterSnapshot {
    /// Builds the snapshot an entry probe would capture for a two-argument
    /// call on any supported target: the arguments are placed in the first
    /// two argument registers *and* mirrored into the cdecl stack layout
    /// (return address at SP, arguments above it).
    pub fn for_call(arg1: u64, arg2: u64) -> Self {
        let mut snapshot = Self {
            arg_regs: [0; 6],
            sp: 0,
            stack: [0; STACK_WINDOW],
            stack_len: STACK_WINDOW,
        };
        snapshot.arg_regs[0] = arg1;
        snapshot.arg_regs[1] = arg2;
        snapshot.stack[4..8].copy_from_slice(&(arg1 as u32).to_le_bytes());
        snapshot.stack[8..12].copy_from_slice(&(arg2 as u32).to_le_bytes());
        snapshot
    }
}

/// Error type for argument extraction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// The build target's ABI is not covered by [`scancode_from_entry`].
    #[error("unsupported architecture `{0}` for entry-probe argument extraction")]
    UnsupportedArchitecture(&'static str),

    /// The captured stack window ends before the argument's slot.
    #[error("stack window too short: need {needed} bytes, captured {available}")]
    StackTruncated { needed: usize, available: usize },
}

/// Extracts the low byte of the intercepted call's second argument,
/// interpreted per the build target's calling convention.
pub fn scancode_from_entry(snapshot: &RegisterSnapshot) -> Result<u8, ExtractError> {
    #[cfg(target_arch = "x86_64")]
    {
        // System V AMD64: second integer argument in RSI.
        Ok((snapshot.arg_regs[1] & 0xFF) as u8)
    }

    #[cfg(target_arch = "aarch64")]
    {
        // AAPCS64: second integer argument in X1.
        Ok((snapshot.arg_regs[1] & 0xFF) as u8)
    }

    #[cfg(target_arch = "x86")]
    {
        // cdecl: the return address sits at SP, arguments above it, so the
        // second argument's low byte is the little-endian word at SP + 8.
        const OFFSET: usize = 8;
        if snapshot.stack_len < OFFSET + 4 {
            return Err(ExtractError::StackTruncated {
                needed: OFFSET + 4,
                available: snapshot.stack_len,
            });
        }
        Ok(snapshot.stack[OFFSET])
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "x86")))]
    {
        let _ = snapshot;
        Err(ExtractError::UnsupportedArchitecture(std::env::consts::ARCH))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
