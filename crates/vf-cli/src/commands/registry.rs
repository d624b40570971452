use anyhow::Context;
use vf_core::entities::VendorRegistryEntry;
use vf_core::enums::UrlType;
use vf_db::updates::registry::RegistryUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::RegistryCommands;
use crate::commands::shared::parse::parse_url_slot;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vfc registry`.
pub async fn handle(
    action: &RegistryCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        RegistryCommands::Get { name } => {
            let entry = ctx
                .service
                .lookup_registry(name)
                .await?
                .with_context(|| format!("vendor '{name}' is not in the registry"))?;
            output(&entry, flags.format)
        }
        RegistryCommands::List => output(&ctx.service.list_registry().await?, flags.format),
        RegistryCommands::Set {
            vendor,
            aliases,
            urls,
        } => {
            let slots = urls
                .iter()
                .map(|raw| parse_url_slot(raw))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let entry = set(vendor, aliases, &slots, ctx).await?;
            output(&entry, flags.format)
        }
    }
}

async fn set(
    vendor: &str,
    aliases: &[String],
    slots: &[(UrlType, Option<String>)],
    ctx: &AppContext,
) -> anyhow::Result<VendorRegistryEntry> {
    if ctx.service.lookup_registry(vendor).await?.is_some() {
        let mut builder = RegistryUpdateBuilder::new();
        if !aliases.is_empty() {
            builder = builder.aliases(aliases.to_vec());
        }
        for (url_type, url) in slots {
            builder = match url {
                Some(url) => builder.url(*url_type, url.as_str()),
                None => builder.clear_url(*url_type),
            };
        }
        return Ok(ctx
            .service
            .update_registry_entry(vendor, &builder.build())
            .await?);
    }

    let mut entry = VendorRegistryEntry::new(vendor);
    entry.aliases = aliases.to_vec();
    for (url_type, url) in slots
        .iter()
        .filter_map(|(url_type, url)| url.as_deref().map(|url| (*url_type, url)))
    {
        entry.set_url(url_type, url);
    }
    Ok(ctx.service.upsert_registry_entry(&entry).await?)
}
