pub mod headless;

pub use headless::{HeadlessLauncher, HeadlessSurface, SurfaceNotification};
