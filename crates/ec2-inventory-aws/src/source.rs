//! The provider seam: listing instances page by page and resolving image
//! names, backed by EC2.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_ec2::types::{Filter, Instance};
use aws_sdk_ec2::Client;
use tracing::debug;

use ec2_inventory_common::{InstanceRecord, InstanceTag, TagFilter};

/// Where instance records come from.
///
/// Listing is exposed one page per call so a failure part-way through a
/// scan can be tolerated by the caller, while a failure of the very first
/// call is still seen directly.
#[async_trait]
pub trait InstanceSource: Send + Sync {
    /// Fetch one page of instances matching the filters. `None` requests
    /// the first page; the returned token, when present, requests the next.
    async fn list_page(
        &self,
        filters: &[TagFilter],
        next_token: Option<String>,
    ) -> Result<(Vec<InstanceRecord>, Option<String>)>;

    /// Resolve an image identifier to the image's name string.
    async fn image_name(&self, image_id: &str) -> Result<String>;
}

/// EC2-backed source: `DescribeInstances` for listing, `DescribeImages` for
/// image names. Filter keys pass through to the API verbatim.
pub struct Ec2InstanceSource {
    client: Client,
}

impl Ec2InstanceSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InstanceSource for Ec2InstanceSource {
    async fn list_page(
        &self,
        filters: &[TagFilter],
        next_token: Option<String>,
    ) -> Result<(Vec<InstanceRecord>, Option<String>)> {
        let mut request = self.client.describe_instances();
        for filter in provider_filters(filters) {
            request = request.filters(filter);
        }
        if let Some(token) = next_token {
            request = request.next_token(token);
        }
        let response = request
            .send()
            .await
            .context("DescribeInstances request failed")?;

        let records: Vec<InstanceRecord> = response
            .reservations()
            .iter()
            .flat_map(|reservation| reservation.instances())
            .map(record_from_instance)
            .collect();
        debug!("Listed {} instance(s) in this page", records.len());
        Ok((records, response.next_token().map(str::to_string)))
    }

    async fn image_name(&self, image_id: &str) -> Result<String> {
        let response = self
            .client
            .describe_images()
            .image_ids(image_id)
            .send()
            .await
            .with_context(|| format!("DescribeImages request for {image_id} failed"))?;
        let image = response
            .images()
            .first()
            .with_context(|| format!("Image {image_id} not found"))?;
        let name = image
            .name()
            .with_context(|| format!("Image {image_id} has no name"))?;
        Ok(name.to_string())
    }
}

/// One provider filter per tag filter, input order preserved.
fn provider_filters(filters: &[TagFilter]) -> Vec<Filter> {
    filters
        .iter()
        .map(|filter| {
            Filter::builder()
                .name(filter.key.as_str())
                .values(filter.value.as_str())
                .build()
        })
        .collect()
}

/// Total conversion: attributes the API did not populate become `None` or
/// empty, never an error.
fn record_from_instance(instance: &Instance) -> InstanceRecord {
    InstanceRecord {
        id: instance.instance_id().map(str::to_string),
        tags: instance
            .tags()
            .iter()
            .filter_map(|tag| match (tag.key(), tag.value()) {
                (Some(key), Some(value)) => Some(InstanceTag {
                    key: key.to_string(),
                    value: value.to_string(),
                }),
                _ => None,
            })
            .collect(),
        private_address: instance.private_ip_address().map(str::to_string),
        image_id: instance.image_id().map(str::to_string),
    }
}
