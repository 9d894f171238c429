pub mod display;
pub mod optical;

pub use display::Win32Displays;
pub use optical::WmiCdrom;
