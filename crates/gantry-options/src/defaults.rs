//! Baked-in defaults for the spike simulator target.

/// Simulator executable looked up on `PATH` when no override is supplied.
pub const SPIKE_EXE: &str = "spike";

/// Proxy-kernel image handed to the simulator ahead of the target binary.
pub const SPIKE_PK: &str = "pk";

/// RISC-V ISA string passed to both the cross toolchain and the simulator.
pub const ARCH: &str = "rv32gc";

/// Application binary interface for the cross toolchain.
pub const ABI: &str = "ilp32d";

/// Cross-compiler target triple.
pub const TRIPLE: &str = "riscv32-unknown-elf";
