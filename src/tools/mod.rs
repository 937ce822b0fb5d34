mod focus_measure;
mod heic_converter;
mod image_loader;
mod image_scanner;
mod path_validator;

pub use focus_measure::{BlurEstimate, BlurMap, estimate_blur, pretty_blur_map};
pub use heic_converter::{ConvertError, HeicConverter, SipsConverter};
pub use image_loader::{DecodeError, load_image};
pub use image_scanner::{IMAGE_EXTENSIONS, ImageFileInfo, scan_image_files};
pub use path_validator::{ensure_directory_exists, validate_directory_exists};
