pub(crate) mod key;
pub use key::{MAX_KEY_LENGTH, SettingKey, SettingKeyError};

pub(crate) mod options;
pub use options::DeclareOptions;

pub(crate) mod value;
pub use value::Value;
