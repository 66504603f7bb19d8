//! Folding listed instances into the grouped inventory.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use ec2_inventory_common::{InstanceRecord, Inventory, TagFilter};

use crate::source::InstanceSource;

/// Build the inventory for `region` from every instance matching `filters`.
///
/// A failure of the first listing call is returned as an error. Any later
/// failure, whether a mid-scan listing error or a per-record one, logs a
/// warning and returns the partial inventory accumulated so far.
pub async fn build_inventory(
    region: &str,
    filters: &[TagFilter],
    source: &dyn InstanceSource,
) -> Result<Inventory> {
    let mut inventory = Inventory::new(region.to_string());

    let (mut records, mut next_token) = source.list_page(filters, None).await?;
    loop {
        for record in &records {
            if let Err(e) = add_record(&mut inventory, record, source).await {
                warn!("Stopping inventory collection early: {:#}", e);
                return Ok(inventory);
            }
        }
        let Some(token) = next_token else {
            break;
        };
        match source.list_page(filters, Some(token)).await {
            Ok((page, token)) => {
                records = page;
                next_token = token;
            }
            Err(e) => {
                warn!("Stopping inventory collection early: {:#}", e);
                return Ok(inventory);
            }
        }
    }

    debug!(
        "Collected {} host(s) in region {}",
        inventory.hosts().len(),
        inventory.region()
    );
    Ok(inventory)
}

/// Fold one record into the inventory: resolve its name, add it to the
/// region group with its private address, then look up its image to infer
/// the login user.
async fn add_record(
    inventory: &mut Inventory,
    record: &InstanceRecord,
    source: &dyn InstanceSource,
) -> Result<()> {
    let name = record
        .host_name()
        .context("Instance has neither a Name tag nor an id")?;
    inventory.add_host(&name, record.private_address.clone());

    let image_id = record
        .image_id
        .as_deref()
        .with_context(|| format!("Instance {name} has no image id"))?;
    let image_name = source.image_name(image_id).await?;
    inventory.set_user(&name, default_user(&image_name));
    Ok(())
}

// TODO: cis-hardened images currently fall through to "ubuntu"; give them
// their own branch once the intended login user is confirmed.
fn default_user(image_name: &str) -> &'static str {
    if image_name.contains("amzn2-ami") {
        "ec2-user"
    } else {
        "ubuntu"
    }
}
