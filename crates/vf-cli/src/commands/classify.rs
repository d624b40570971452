use anyhow::Context;
use serde::Serialize;
use vf_classify::{Classification, DomainIndex};
use vf_core::entities::VendorUrl;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ClassifyArgs;
use crate::commands::shared::parse::parse_vendor_url;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ClassifyResponse {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor: Option<String>,
    #[serde(flatten)]
    classification: Classification,
}

/// Handle `vfc classify`.
pub async fn handle(args: &ClassifyArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let (vendor, vendor_urls) = match &args.vendor {
        Some(name) => {
            let entry = ctx
                .service
                .lookup_registry(name)
                .await?
                .with_context(|| format!("vendor '{name}' is not in the registry"))?;
            (Some(entry.vendor_name.clone()), entry.urls())
        }
        None => (
            None,
            args.vendor_urls
                .iter()
                .map(|raw| parse_vendor_url(raw))
                .collect::<anyhow::Result<Vec<VendorUrl>>>()?,
        ),
    };

    let classification = DomainIndex::build(&vendor_urls).classify(&args.url);
    output(
        &ClassifyResponse {
            url: args.url.clone(),
            vendor,
            classification,
        },
        flags.format,
    )
}
