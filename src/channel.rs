//! Channel construction from the catalog context.

use crate::config::CatalogContext;
use crate::constants::SCHEMA_CHANNEL;
use crate::declcfg::Channel;
use crate::error::{Error, Result};

/// Builds the single `olm.channel` blob described by the context.
///
/// # Errors
/// * `Error::ChannelError` if the context names a schema other than `olm.channel`
pub fn build_channel(context: &CatalogContext) -> Result<Channel> {
    if context.channel_schema != SCHEMA_CHANNEL {
        return Err(Error::ChannelError(format!(
            "unsupported channel schema '{}', expected '{SCHEMA_CHANNEL}'",
            context.channel_schema
        )));
    }

    Ok(Channel {
        schema: context.channel_schema.clone(),
        name: context.channel_name.clone(),
        package: context.package.clone(),
        entries: context.channel_entries.clone(),
        properties: Vec::new(),
    })
}
