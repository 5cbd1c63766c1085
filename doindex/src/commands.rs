use crate::CLAP_STYLING;
use doindex_core::config::{
    INDEX_NAME_ENV, ROOT_DIR_ENV, SEARCH_HOST_ENV, SEARCH_KEY_ENV, SEARCH_USER_ENV,
};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("doindex")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("doindex")
        .styles(CLAP_STYLING)
        .about(
            "Scans the built site, writes search reports and replaces the hosted search index",
        )
        .after_help(format!(
            "Configuration is read from the environment:\n  \
             {SEARCH_USER_ENV}       search application id (required)\n  \
             {SEARCH_KEY_ENV}  search write key (required)\n  \
             {INDEX_NAME_ENV}        target index name (required)\n  \
             {SEARCH_HOST_ENV}       search API host override\n  \
             {ROOT_DIR_ENV}         project root (default: ../..)"
        ))
}
