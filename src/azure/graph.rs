//! Azure Resource Graph snapshot of a subscription.
//!
//! Queries Resource Graph for every VM, managed disk, availability set and NIC
//! of a subscription, then adds resource groups and per-location size catalogs.

use super::cli;
use crate::config;
use crate::error::Result;
use crate::models::{Location, ResourceDocument, ResourceGroup, ResourceType, VmSize};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Resource Graph query; `{subscription_id}` and `{types}` are substituted.
const RESOURCE_QUERY: &str = r#"resources
        | where subscriptionId =~ "{subscription_id}"
        | where type in~ ({types})
        | project id, name, type, location, resourceGroup, tags, sku, plan, zones, managedBy, properties
        | sort by id asc"#;

/// One page returned by `az graph query`.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct GraphPage {
    /// Resource documents in this page.
    pub data: Vec<ResourceDocument>,
    /// Token for pagination (if more results available).
    pub skip_token: Option<String>,
    /// Total number of records matching the query.
    pub total_records: Option<u32>,
    /// Count of records in this response.
    pub count: i32,
}

/// Everything stage 1 of a subscription load needs.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct Snapshot {
    pub subscription_id: String,
    /// Raw documents of every VM, managed disk, availability set and NIC.
    pub resources: Vec<ResourceDocument>,
    #[serde(default)]
    pub resource_groups: Vec<ResourceGroup>,
    /// Size catalogs for the locations the VMs live in.
    #[serde(default)]
    pub locations: Vec<Location>,
}

fn resource_query(subscription_id: &str) -> String {
    let types = ResourceType::ALL
        .iter()
        .map(|t| format!("\"{}\"", t.as_str()))
        .join(", ");
    RESOURCE_QUERY
        .replace("{subscription_id}", subscription_id)
        .replace("{types}", &types)
}

/// Parse `az` JSON output, reporting the failing JSON path.
fn parse_output<T: DeserializeOwned>(output: &str) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(output);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        log::error!("OUTPUT START:\n\n{}\n\nOUTPUT END\n", output);
        e.into()
    })
}

/// Fetch all resource documents of the subscription, following skip tokens.
pub fn run_az_cli_graph(subscription_id: &str) -> Result<Vec<ResourceDocument>> {
    let query = resource_query(subscription_id);
    let mut resources: Vec<ResourceDocument> = Vec::new();
    let mut skip_token_param: String = String::new();
    let mut count_blocks_returned = 0;
    let mut total_count: i32 = 0;

    while skip_token_param != "--skip-token null" {
        let cmd = format!(
            "az graph query --first {page} {skip_token_param} -q '{query}' --output json",
            page = config::GRAPH_PAGE_SIZE
        );
        let output = cli::run(&cmd)?;
        let page: GraphPage = parse_output(&output)?;

        let skip_token_new = page.skip_token.clone().unwrap_or_else(|| "null".to_string());
        let skip_token_new = format!("--skip-token {skip_token_new}");
        if skip_token_new == skip_token_param {
            return Err(crate::error::ArmError::Transport(
                "Skip token not unique - possible infinite loop".to_string(),
            ));
        }
        skip_token_param = skip_token_new;

        total_count += page.count;
        log::info!(
            "got block#{count_blocks_returned:2} record_count=+{count:3} => {total_count:3} of {total:?}",
            count = page.count,
            total = page.total_records,
        );
        resources.extend(page.data);

        // Rate limiting pause
        std::thread::sleep(std::time::Duration::from_millis(config::SLEEP_MSEC * 5));
        count_blocks_returned += 1;
    }

    log::info!(
        "Got {} resources in {count_blocks_returned} blocks from az graph query",
        resources.len()
    );
    Ok(resources)
}

pub fn run_az_group_list(subscription_id: &str) -> Result<Vec<ResourceGroup>> {
    let output = cli::run(&format!(
        "az group list --subscription {subscription_id} --output json"
    ))?;
    parse_output(&output)
}

pub fn run_az_vm_list_sizes(subscription_id: &str, location: &str) -> Result<Vec<VmSize>> {
    let output = cli::run(&format!(
        "az vm list-sizes --location {location} --subscription {subscription_id} --output json"
    ))?;
    parse_output(&output)
}

/// Distinct VM locations, lowercased and sorted.
fn vm_locations(resources: &[ResourceDocument]) -> Vec<String> {
    resources
        .iter()
        .filter(|r| ResourceType::from_type_str(r.kind()) == Some(ResourceType::VirtualMachine))
        .filter_map(|r| r.str_at(&["location"]))
        .map(|l| l.to_ascii_lowercase())
        .unique()
        .sorted()
        .collect()
}

/// Build a full [`Snapshot`] of the subscription from the Azure CLI.
pub fn run_az_cli_snapshot(subscription_id: &str) -> Result<Snapshot> {
    let resources = run_az_cli_graph(subscription_id)?;
    let resource_groups = run_az_group_list(subscription_id)?;

    let mut locations = Vec::new();
    for location in vm_locations(&resources) {
        log::info!("Reading VM sizes for {location}");
        let vm_sizes = run_az_vm_list_sizes(subscription_id, &location)?;
        locations.push(Location {
            name: location,
            vm_sizes,
        });
        std::thread::sleep(std::time::Duration::from_millis(config::SLEEP_MSEC));
    }

    Ok(Snapshot {
        subscription_id: subscription_id.to_string(),
        resources,
        resource_groups,
        locations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArmError;
    use serde_json::json;

    #[test]
    fn test_resource_query_lists_all_types() {
        let query = resource_query("0000-1111");
        assert!(query.contains(r#"subscriptionId =~ "0000-1111""#));
        for t in ResourceType::ALL {
            assert!(query.contains(t.as_str()), "query misses {}", t.as_str());
        }
        assert!(!query.contains('\''), "query must not contain single quotes");
    }

    #[test]
    fn test_parse_graph_page() {
        let output = json!({
            "count": 1,
            "data": [ { "id": "/x/disks/d1", "name": "d1", "type": "microsoft.compute/disks" } ],
            "skip_token": null,
            "total_records": 1
        })
        .to_string();
        let page: GraphPage = parse_output(&output).expect("page parses");
        assert_eq!(page.count, 1);
        assert_eq!(page.data[0].str_at(&["name"]), Some("d1"));
        assert!(page.skip_token.is_none());
    }

    #[test]
    fn test_parse_error_reports_path() {
        let output = r#"[ { "name": "Standard_B1s", "numberOfCores": "one" } ]"#;
        let err = parse_output::<Vec<VmSize>>(output).unwrap_err();
        match err {
            ArmError::Parse { path, .. } => assert_eq!(path, "[0].numberOfCores"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_vm_locations_distinct() {
        let resources = vec![
            ResourceDocument::new(json!({ "type": "Microsoft.Compute/virtualMachines", "location": "EastUS" })),
            ResourceDocument::new(json!({ "type": "Microsoft.Compute/virtualMachines", "location": "eastus" })),
            ResourceDocument::new(json!({ "type": "Microsoft.Compute/virtualMachines", "location": "westeurope" })),
            ResourceDocument::new(json!({ "type": "Microsoft.Compute/disks", "location": "australiaeast" })),
        ];
        assert_eq!(vm_locations(&resources), vec!["eastus", "westeurope"]);
    }
}
