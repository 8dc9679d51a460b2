//! lakeFS configuration API definition.
//!
//! ## Endpoints
//!
//! - `getGarbageCollectionConfig` - GET /config/garbage-collection
//! - `getLakeFSVersion` - GET /config/version
//! - `getSetupState` - GET /setup_lakefs
//! - `getStorageConfig` - GET /config/storage
//! - `setup` - POST /setup_lakefs
//! - `setupCommPrefs` - POST /setup_comm_prefs
//!
//! Setup and the setup state are public so a fresh installation can be
//! bootstrapped; everything else needs credentials.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use tether_definitions::ConfigApi;
//!
//! let api = ConfigApi::from_env()?;
//! let version = api.get_lake_fs_version().await?;
//! println!("{:?}", version.version);
//! ```

pub mod schemas;
mod types;

pub use types::*;

use std::sync::LazyLock;

use tether::{
    Arguments, Client, ClientConfig, ConfigError, EnvCredentials, Facade, ReqwestTransport,
    TetherError, Transport, from_model_unchecked,
};
use tether_define::{
    AuthStrategy, DefinitionError, EndpointDescriptor, EndpointTable, RequestBody, ResponseSpec,
    RestMethod, StatusKey,
};
use url::Url;

/// Tag shared by every endpoint in the table.
pub const TAG: &str = "config";

/// Path prefix of the lakeFS API on a server.
pub const BASE_PATH: &str = "/api/v1";

/// Server URL, with or without [`BASE_PATH`].
pub const ENDPOINT_URL_VAR: &str = "LAKECTL_SERVER_ENDPOINT_URL";
pub const ACCESS_KEY_ID_VARS: &[&str] = &["LAKECTL_CREDENTIALS_ACCESS_KEY_ID"];
pub const SECRET_ACCESS_KEY_VARS: &[&str] = &["LAKECTL_CREDENTIALS_SECRET_ACCESS_KEY"];

pub const GET_GARBAGE_COLLECTION_CONFIG: &str = "getGarbageCollectionConfig";
pub const GET_LAKE_FS_VERSION: &str = "getLakeFSVersion";
pub const GET_SETUP_STATE: &str = "getSetupState";
pub const GET_STORAGE_CONFIG: &str = "getStorageConfig";
pub const SETUP: &str = "setup";
pub const SETUP_COMM_PREFS: &str = "setupCommPrefs";

static CONFIG_ENDPOINTS: LazyLock<Result<EndpointTable, DefinitionError>> =
    LazyLock::new(define_config_endpoints);

/// The process-wide endpoint table, built on first use.
///
/// ## Errors
///
/// Returns the construction error if a descriptor is malformed. The table
/// is only built once, so every call reports the same error.
pub fn config_endpoints() -> Result<&'static EndpointTable, DefinitionError> {
    CONFIG_ENDPOINTS.as_ref().map_err(Clone::clone)
}

/// Builds the lakeFS configuration endpoint table.
pub fn define_config_endpoints() -> Result<EndpointTable, DefinitionError> {
    let endpoints: Vec<EndpointDescriptor> = vec![
        EndpointDescriptor::builder()
            .id(GET_GARBAGE_COLLECTION_CONFIG)
            .method(RestMethod::Get)
            .path("/config/garbage-collection")
            .description("Garbage collection settings of the server")
            .response(ResponseSpec::json(200, schemas::garbage_collection_config()))
            .response(ResponseSpec::json(401, schemas::error()).describe("Unauthorized"))
            .response(ResponseSpec::json(StatusKey::Default, schemas::error()))
            .secured()
            .tag(TAG)
            .build()?,
        EndpointDescriptor::builder()
            .id(GET_LAKE_FS_VERSION)
            .method(RestMethod::Get)
            .path("/config/version")
            .description("Running lakeFS version and upgrade recommendation")
            .response(ResponseSpec::json(200, schemas::version_config()))
            .response(ResponseSpec::json(401, schemas::error()).describe("Unauthorized"))
            .response(ResponseSpec::json(StatusKey::Default, schemas::error()))
            .secured()
            .tag(TAG)
            .build()?,
        EndpointDescriptor::builder()
            .id(GET_SETUP_STATE)
            .method(RestMethod::Get)
            .path("/setup_lakefs")
            .description("Whether the installation has been set up")
            .response(ResponseSpec::json(200, schemas::setup_state()))
            .response(ResponseSpec::json(StatusKey::Default, schemas::error()))
            .tag(TAG)
            .build()?,
        EndpointDescriptor::builder()
            .id(GET_STORAGE_CONFIG)
            .method(RestMethod::Get)
            .path("/config/storage")
            .description("Blockstore type and namespace rules")
            .response(ResponseSpec::json(200, schemas::storage_config()))
            .response(ResponseSpec::json(401, schemas::error()).describe("Unauthorized"))
            .response(ResponseSpec::json(StatusKey::Default, schemas::error()))
            .secured()
            .tag(TAG)
            .build()?,
        EndpointDescriptor::builder()
            .id(SETUP)
            .method(RestMethod::Post)
            .path("/setup_lakefs")
            .description("Creates the initial admin user")
            .body(RequestBody::json(schemas::setup()))
            .response(ResponseSpec::json(200, schemas::credentials_with_secret()))
            .response(ResponseSpec::json(400, schemas::error()).describe("Bad Request"))
            .response(ResponseSpec::json(409, schemas::error()).describe("Setup already done"))
            .response(ResponseSpec::json(StatusKey::Default, schemas::error()))
            .tag(TAG)
            .build()?,
        EndpointDescriptor::builder()
            .id(SETUP_COMM_PREFS)
            .method(RestMethod::Post)
            .path("/setup_comm_prefs")
            .description("Stores the admin's communication preferences")
            .body(RequestBody::json(schemas::comm_prefs_input()))
            .response(ResponseSpec::empty(200))
            .response(ResponseSpec::json(409, schemas::error()).describe("Setup already done"))
            .response(
                ResponseSpec::json(412, schemas::error())
                    .describe("Wrong setup state for this operation"),
            )
            .response(ResponseSpec::json(StatusKey::Default, schemas::error()))
            .tag(TAG)
            .build()?,
    ];
    EndpointTable::new(endpoints)
}

/// Appends [`BASE_PATH`] to a server URL that lacks it.
///
/// ## Errors
///
/// Returns an error if `endpoint` is not an absolute http(s)-style URL.
pub fn api_base_url(endpoint: &str) -> Result<String, ConfigError> {
    let mut url = Url::parse(endpoint)?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::NotABaseUrl {
            url: endpoint.to_string(),
        });
    }
    let path = url.path().trim_end_matches('/').to_string();
    if !path.ends_with(BASE_PATH) {
        url.set_path(&format!("{path}{BASE_PATH}"));
    }
    Ok(url.to_string())
}

/// Basic auth from the `LAKECTL_CREDENTIALS_*` variables, read on every call.
pub fn env_credentials() -> EnvCredentials {
    EnvCredentials::new(AuthStrategy::Basic, SECRET_ACCESS_KEY_VARS.iter().copied())
        .username_from(ACCESS_KEY_ID_VARS.iter().copied())
}

/// The lakeFS configuration API.
///
/// Each method performs exactly one round trip through the client it was
/// built from.
///
/// ## Examples
///
/// ```rust,ignore
/// use tether::{Client, ClientConfig, StaticCredentials};
/// use tether_definitions::ConfigApi;
///
/// let client = Client::new(ClientConfig::new("http://localhost:8000/api/v1")?)?
///     .with_auth(StaticCredentials::basic(access_key_id, secret_access_key));
/// let api = ConfigApi::new(&client)?;
/// let storage = api.get_storage_config().await?;
/// ```
#[derive(Debug)]
pub struct ConfigApi<T = ReqwestTransport> {
    facade: Facade<'static, T>,
}

impl ConfigApi<ReqwestTransport> {
    /// Builds a client from `LAKECTL_SERVER_ENDPOINT_URL` with basic auth
    /// from the `LAKECTL_CREDENTIALS_*` variables.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the endpoint variable is
    /// unset, or an error if it is not a valid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = std::env::var(ENDPOINT_URL_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingField {
                field: ENDPOINT_URL_VAR,
            })?;
        let config = ClientConfig::new(api_base_url(&endpoint)?)?;
        let client = Client::new(config)?.with_auth(env_credentials());
        Self::new(&client)
    }
}

impl<T: Transport> ConfigApi<T> {
    /// Binds the configuration endpoints to `client`.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Definition`] if the endpoint table is malformed.
    pub fn new(client: &Client<T>) -> Result<Self, ConfigError> {
        let table = config_endpoints()?;
        let facade = Facade::new(
            "ConfigApi",
            table,
            client,
            [
                GET_GARBAGE_COLLECTION_CONFIG,
                GET_LAKE_FS_VERSION,
                GET_SETUP_STATE,
                GET_STORAGE_CONFIG,
                SETUP,
                SETUP_COMM_PREFS,
            ],
        )?;
        Ok(Self { facade })
    }

    /// The underlying operations, for callers that want raw [`tether_define::TypedValue`]s.
    pub fn facade(&self) -> &Facade<'static, T> {
        &self.facade
    }

    pub async fn get_garbage_collection_config(
        &self,
    ) -> Result<GarbageCollectionConfig, TetherError> {
        self.facade
            .call_as(GET_GARBAGE_COLLECTION_CONFIG, Arguments::new())
            .await
    }

    pub async fn get_lake_fs_version(&self) -> Result<VersionConfig, TetherError> {
        self.facade.call_as(GET_LAKE_FS_VERSION, Arguments::new()).await
    }

    pub async fn get_setup_state(&self) -> Result<SetupState, TetherError> {
        self.facade.call_as(GET_SETUP_STATE, Arguments::new()).await
    }

    pub async fn get_storage_config(&self) -> Result<StorageConfig, TetherError> {
        self.facade.call_as(GET_STORAGE_CONFIG, Arguments::new()).await
    }

    /// Creates the initial admin user and returns its credentials.
    ///
    /// ## Errors
    ///
    /// An empty username or key is rejected before anything is sent. A
    /// server that is already set up answers with a 409 [`TetherError::Api`].
    pub async fn setup(&self, setup: &Setup) -> Result<CredentialsWithSecret, TetherError> {
        let body = from_model_unchecked(setup, &schemas::setup())?;
        self.facade
            .call_as(SETUP, Arguments::new().body(body))
            .await
    }

    pub async fn setup_comm_prefs(&self, prefs: &CommPrefsInput) -> Result<(), TetherError> {
        let body = from_model_unchecked(prefs, &schemas::comm_prefs_input())?;
        self.facade
            .call(SETUP_COMM_PREFS, Arguments::new().body(body))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_six_tagged_endpoints() {
        let table = config_endpoints().unwrap();
        assert_eq!(table.len(), 6);
        assert_eq!(table.tagged(TAG).count(), 6);
    }

    #[test]
    fn security_per_endpoint() {
        let table = config_endpoints().unwrap();
        let secured: Vec<&str> = table
            .iter()
            .filter(|e| e.is_secured())
            .map(|e| e.id().as_str())
            .collect();
        assert_eq!(secured.len(), 3);
        for id in [GET_GARBAGE_COLLECTION_CONFIG, GET_LAKE_FS_VERSION, GET_STORAGE_CONFIG] {
            assert!(secured.contains(&id), "{id} should be secured");
        }
        for id in [GET_SETUP_STATE, SETUP, SETUP_COMM_PREFS] {
            assert!(!table.get(id).unwrap().is_secured(), "{id} should be public");
        }
    }

    #[test]
    fn setup_state_and_setup_share_a_path() {
        let table = config_endpoints().unwrap();
        let state = table.get(GET_SETUP_STATE).unwrap();
        let setup = table.get(SETUP).unwrap();
        assert_eq!(state.path().as_str(), setup.path().as_str());
        assert_eq!(state.method(), RestMethod::Get);
        assert_eq!(setup.method(), RestMethod::Post);
        assert!(setup.request_body().unwrap().required);
    }

    #[test]
    fn comm_prefs_declares_error_statuses() {
        let table = config_endpoints().unwrap();
        let prefs = table.get(SETUP_COMM_PREFS).unwrap();
        assert!(!prefs.response_for(200).unwrap().has_body());
        assert!(prefs.response_for(409).unwrap().has_body());
        assert!(prefs.response_for(412).unwrap().has_body());
        assert_eq!(prefs.response_for(500).unwrap().status, StatusKey::Default);
    }

    #[test]
    fn base_path_is_appended_once() {
        assert_eq!(
            api_base_url("http://localhost:8000").unwrap(),
            "http://localhost:8000/api/v1"
        );
        assert_eq!(
            api_base_url("http://localhost:8000/").unwrap(),
            "http://localhost:8000/api/v1"
        );
        assert_eq!(
            api_base_url("https://lakefs.example.com/api/v1").unwrap(),
            "https://lakefs.example.com/api/v1"
        );
        assert_eq!(
            api_base_url("https://example.com/lakefs/").unwrap(),
            "https://example.com/lakefs/api/v1"
        );
        assert!(matches!(
            api_base_url("mailto:ops@example.com"),
            Err(ConfigError::NotABaseUrl { .. })
        ));
        assert!(matches!(
            api_base_url("localhost:8000"),
            Err(ConfigError::InvalidUrl(_)) | Err(ConfigError::NotABaseUrl { .. })
        ));
    }
}
