#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(
        "Missing Akamai EdgeGrid credentials: {}. Set them in the environment or akamai.env, \
         or provide an .edgerc file",
        .0.join(", ")
    )]
    MissingCredentials(Vec<String>),

    #[error("Akamai API error [{status}] on {path}: {body}")]
    Api {
        status: u16,
        path: String,
        body: String,
    },

    #[error("No usable contract/group combination found")]
    NoContractGroups,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),
}
