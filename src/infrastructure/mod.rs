pub mod credential_store;

pub use credential_store::{
    CredentialProvider, CredentialService, EnvCredential, FileCredentialStore, MemoryCredential,
    API_KEY_STORAGE_KEY,
};
