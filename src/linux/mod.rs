pub mod display;
pub mod optical;

pub use display::SysfsDisplays;
pub use optical::DevCdrom;
