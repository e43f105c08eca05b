/// CRM API constants

/// Default root of the company-scoped CRM REST API
pub const DEFAULT_BASE_URL: &str = "https://api.moyklass.com/v1/company";

pub const TOKEN_PATH: &str = "/auth/getToken";
pub const USERS_PATH: &str = "/users";

/// Header carrying the session token on authenticated calls
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Attribute catalog locations, probed in this order
pub const DEFAULT_CATALOG_ENDPOINTS: [&str; 3] =
    ["/attributes", "/userfields/attributes", "/users/attributes"];

/// Token field names seen across API revisions, first present wins
pub const TOKEN_FIELDS: [&str; 3] = ["accessToken", "token", "access_token"];

/// Descriptor ID fields, first numeric one wins
pub const DESCRIPTOR_ID_FIELDS: [&str; 2] = ["attributeId", "id"];
pub const DESCRIPTOR_CODE_FIELDS: [&str; 4] = ["code", "key", "sysName", "systemName"];
pub const DESCRIPTOR_NAME_FIELDS: [&str; 2] = ["name", "title"];

/// Logical attributes with an optional fixed-ID override in configuration
pub const PARENT1_ATTRIBUTE: &str = "parent1";
pub const DISCOUNT_ATTRIBUTE: &str = "discount";

/// Number of raw catalog entries echoed back by the attribute listing
pub const CATALOG_SAMPLE_SIZE: usize = 10;
