mod category;
mod media;
mod response;

pub use category::MediaCategory;
pub use media::{
    CreateMediaRequest, CreatedMedia, MediaRecord, MediaUpdate, NewMediaRecord,
    UpdateMediaRequest,
};
pub use response::MediaResponse;
