mod listing;
mod upload;

pub use self::listing::{FileList, ListingWorkflow, UploadRecord};
pub use self::upload::{MAX_FILE_SIZE, SelectedFile, UploadWorkflow};
