pub const MAX_TITLE_LEN: usize = 256;
pub const MAX_DESCRIPTION_LEN: usize = 4096;
pub const MAX_NAME_LEN: usize = 256;
pub const MAX_EMAIL_LEN: usize = 320;
pub const MAX_PHONE_LEN: usize = 32;
pub const MAX_ADDRESS_LEN: usize = 512;
pub const MAX_DATE_LEN: usize = 32;
pub const MAX_RESOURCES_PER_VENUE: usize = 256;
pub const MAX_RESOURCE_VALUE_LEN: usize = 1024;
