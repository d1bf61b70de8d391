//! Input validation for the storage pages of the virtualization console.
//!
//! Three independent forms: [`StoragePoolInput`], [`VolumeInput`] and
//! [`CloneImageInput`]. Each takes the raw submitted mapping and returns a
//! typed value or per-field errors carrying localizable message keys.

pub mod clone_image;
pub mod config;
pub mod error;
pub mod messages;
pub mod storage_pool;
pub mod types;
pub mod validation;
pub mod volume;

pub use clone_image::CloneImageInput;
pub use config::ValidationConfig;
pub use error::{CoreError, ErrorKind, FieldError, FieldErrors};
pub use messages::{render_errors, EnglishCatalog, MessageCatalog};
pub use storage_pool::{PoolRequirements, StoragePoolInput, StoragePoolType};
pub use types::{form_data_from_json, form_data_from_pairs, FormData};
pub use validation::{Form, FormKind};
pub use volume::{ImageFormat, VolumeInput};
