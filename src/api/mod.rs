pub mod palette;
pub mod sessions;
pub mod subjects;

pub use palette::{handle_palette, SwatchResponse, __path_handle_palette};
pub use sessions::{
    handle_preview, handle_set_color, handle_transition, ColorRequest, TransitionResponse,
    __path_handle_preview, __path_handle_set_color, __path_handle_transition,
};
pub use subjects::{
    handle_delete, handle_image, handle_share, handle_upload, ShareResponse, SubjectResponse,
    __path_handle_delete, __path_handle_image, __path_handle_share, __path_handle_upload,
};
