//! Wire schemas of the lakeFS configuration API.
//!
//! In-memory field names are snake_case; where lakeFS uses another spelling
//! on the wire the field is declared with [`ObjectSchema::renamed`].

use tether_define::{ObjectSchema, Schema, StringFormat};

pub fn error() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .field("message", Schema::string())
            .required(["message"]),
    )
}

pub fn garbage_collection_config() -> Schema {
    Schema::object(ObjectSchema::new().field("grace_period", Schema::integer()))
}

pub fn version_config() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .field("version", Schema::string())
            .field("latest_version", Schema::string())
            .field("upgrade_recommended", Schema::boolean())
            .field("upgrade_url", Schema::string()),
    )
}

pub fn login_config() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .renamed(
                "rbac",
                "RBAC",
                Schema::enumeration(["none", "simplified", "external", "internal"]),
            )
            .field("username_ui_placeholder", Schema::string())
            .field("password_ui_placeholder", Schema::string())
            .field("login_url", Schema::string())
            .field("login_failed_message", Schema::string())
            .field("fallback_login_url", Schema::string())
            .field("fallback_login_label", Schema::string())
            .field("login_cookie_names", Schema::array(Schema::string()))
            .field("logout_url", Schema::string())
            .required(["login_url", "login_cookie_names", "logout_url"]),
    )
}

pub fn setup_state() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .field(
                "state",
                Schema::enumeration(["initialized", "not_initialized"]),
            )
            .field("comm_prefs_missing", Schema::boolean())
            .field("login_config", login_config()),
    )
}

pub fn storage_config() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .field("blockstore_type", Schema::string())
            .field("blockstore_namespace_example", Schema::string())
            .renamed(
                "blockstore_namespace_validity_regex",
                "blockstore_namespace_ValidityRegex",
                Schema::string(),
            )
            .field("default_namespace_prefix", Schema::string())
            .field("pre_sign_support", Schema::boolean())
            .field("pre_sign_support_ui", Schema::boolean())
            .field("import_support", Schema::boolean())
            .field("import_validity_regex", Schema::string())
            .required([
                "blockstore_type",
                "blockstore_namespace_example",
                "blockstore_namespace_validity_regex",
                "pre_sign_support",
                "pre_sign_support_ui",
                "import_support",
                "import_validity_regex",
            ]),
    )
}

pub fn access_key_credentials() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .field("access_key_id", Schema::string().min_length(1))
            .field("secret_access_key", Schema::string().min_length(1))
            .required(["access_key_id", "secret_access_key"]),
    )
}

pub fn setup() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .field("username", Schema::string().min_length(1))
            .field("key", access_key_credentials())
            .required(["username"]),
    )
}

pub fn credentials_with_secret() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .field("access_key_id", Schema::string())
            .field("secret_access_key", Schema::string())
            .field("creation_date", Schema::integer())
            .required(["access_key_id", "secret_access_key", "creation_date"]),
    )
}

pub fn comm_prefs_input() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .field("email", Schema::formatted(StringFormat::Email))
            .renamed("feature_updates", "featureUpdates", Schema::boolean())
            .renamed("security_updates", "securityUpdates", Schema::boolean())
            .required(["feature_updates", "security_updates"]),
    )
}
