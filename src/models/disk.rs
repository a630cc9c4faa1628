//! Disks attached to a virtual machine.
//!
//! A VM document describes each disk either inline (a `vhd` blob in a storage
//! account) or as a reference to a managed disk resource. [`Disk::resolve`]
//! picks the variant from the document alone and only then consults the index.

use super::{ManagedDisk, ResourceDocument, ResourceId};
use crate::error::{ArmError, Result};
use crate::subscription::ResourceIndex;
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// `https://<account>.blob.<suffix>/<container>/<blob path>`
static VHD_URI_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_vhd_uri_regex() -> &'static Regex {
    VHD_URI_REGEX.get_or_init(|| {
        Regex::new(r"^https?://([^./]+)\.blob\.[^/]+/([^/]+)/(.+)$").expect("Invalid Regex")
    })
}

/// Capability shared by both disk variants.
#[async_trait]
pub trait ArmDisk {
    fn name(&self) -> &str;

    /// The VM document fragment describing this attachment (`osDisk` or a `dataDisks` entry).
    fn attachment(&self) -> &ResourceDocument;

    fn disk_size_gb(&self) -> Option<u64>;

    fn lun(&self) -> Option<u64> {
        self.attachment().u64_at(&["lun"])
    }

    fn caching(&self) -> Option<&str> {
        self.attachment().str_at(&["caching"])
    }

    fn create_option(&self) -> Option<&str> {
        self.attachment().str_at(&["createOption"])
    }

    /// Resolve nested dependent objects.
    async fn initialize_children(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskKind {
    Inline,
    Managed,
}

/// How a managed disk reference was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskLookup {
    ById,
    ByName,
}

#[derive(Debug, Clone)]
pub enum Disk {
    Inline(InlineDisk),
    Managed(ManagedDiskReference),
}

impl Disk {
    /// Build the disk described by `fragment` for the VM `owner`.
    ///
    /// An embedded `vhd` always yields [`Disk::Inline`] without touching the index.
    /// Otherwise the managed disk is looked up by `managedDisk.id` when present,
    /// else by `name`, and the attachment is recorded against the owner.
    pub fn resolve(owner: &ResourceId, fragment: ResourceDocument, index: &ResourceIndex) -> Result<Disk> {
        if fragment.contains(&["vhd"]) {
            log::debug!("{owner}: inline disk '{}'", fragment.str_at(&["name"]).unwrap_or("?"));
            return Ok(Disk::Inline(InlineDisk::new(owner.clone(), fragment)));
        }

        let (disk, lookup) = if let Some(managed_disk_id) = fragment.str_at(&["managedDisk", "id"]) {
            log::debug!("{owner}: seeking managed disk by id '{managed_disk_id}'");
            let disk = index
                .find_managed_disk_by_id(managed_disk_id)
                .ok_or_else(|| ArmError::not_found("managed disk", managed_disk_id))?;
            (disk, DiskLookup::ById)
        } else {
            let managed_disk_name = fragment.require_str(&["name"])?;
            log::debug!(
                "{owner}: seeking managed disk by name '{managed_disk_name}', no managedDisk.id to seek by"
            );
            let disk = index
                .find_managed_disk_by_name(managed_disk_name)
                .ok_or_else(|| ArmError::not_found("managed disk", managed_disk_name))?;
            (disk, DiskLookup::ByName)
        };

        index.attach_managed_disk(disk.id(), owner, &fragment);
        Ok(Disk::Managed(ManagedDiskReference {
            disk,
            owner: owner.clone(),
            attachment: fragment,
            lookup,
        }))
    }

    pub fn kind(&self) -> DiskKind {
        match self {
            Disk::Inline(_) => DiskKind::Inline,
            Disk::Managed(_) => DiskKind::Managed,
        }
    }

    pub fn is_managed(&self) -> bool {
        self.kind() == DiskKind::Managed
    }

    pub fn as_inline(&self) -> Option<&InlineDisk> {
        match self {
            Disk::Inline(d) => Some(d),
            Disk::Managed(_) => None,
        }
    }

    pub fn as_managed(&self) -> Option<&ManagedDiskReference> {
        match self {
            Disk::Managed(d) => Some(d),
            Disk::Inline(_) => None,
        }
    }

    fn as_arm_disk(&self) -> &(dyn ArmDisk + Send + Sync) {
        match self {
            Disk::Inline(d) => d,
            Disk::Managed(d) => d,
        }
    }
}

#[async_trait]
impl ArmDisk for Disk {
    fn name(&self) -> &str {
        self.as_arm_disk().name()
    }

    fn attachment(&self) -> &ResourceDocument {
        self.as_arm_disk().attachment()
    }

    fn disk_size_gb(&self) -> Option<u64> {
        self.as_arm_disk().disk_size_gb()
    }

    async fn initialize_children(&mut self) -> Result<()> {
        match self {
            Disk::Inline(d) => d.initialize_children().await,
            Disk::Managed(d) => d.initialize_children().await,
        }
    }
}

/// Location of an inline disk's backing page blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VhdBlob {
    pub storage_account_name: String,
    pub container_name: String,
    pub blob_name: String,
}

/// A disk described entirely inside its VM's document.
#[derive(Debug, Clone)]
pub struct InlineDisk {
    owner: ResourceId,
    fragment: ResourceDocument,
    blob: Option<VhdBlob>,
}

impl InlineDisk {
    pub fn new(owner: ResourceId, fragment: ResourceDocument) -> InlineDisk {
        InlineDisk {
            owner,
            fragment,
            blob: None,
        }
    }

    pub fn owner(&self) -> &ResourceId {
        &self.owner
    }

    pub fn vhd_uri(&self) -> Option<&str> {
        self.fragment.str_at(&["vhd", "uri"])
    }

    /// Set by [`ArmDisk::initialize_children`].
    pub fn blob(&self) -> Option<&VhdBlob> {
        self.blob.as_ref()
    }
}

#[async_trait]
impl ArmDisk for InlineDisk {
    fn name(&self) -> &str {
        self.fragment.str_at(&["name"]).unwrap_or_default()
    }

    fn attachment(&self) -> &ResourceDocument {
        &self.fragment
    }

    fn disk_size_gb(&self) -> Option<u64> {
        self.fragment.u64_at(&["diskSizeGB"])
    }

    async fn initialize_children(&mut self) -> Result<()> {
        let uri = self.fragment.require_str(&["vhd", "uri"])?;
        let caps = get_vhd_uri_regex()
            .captures(uri)
            .ok_or_else(|| self.fragment.malformed(&["vhd", "uri"]))?;
        let blob = VhdBlob {
            storage_account_name: caps[1].to_string(),
            container_name: caps[2].to_string(),
            blob_name: caps[3].to_string(),
        };
        log::trace!("{}: inline disk blob {:?}", self.owner, blob);
        self.blob = Some(blob);
        Ok(())
    }
}

/// A VM's attachment of an indexed managed disk.
#[derive(Debug, Clone)]
pub struct ManagedDiskReference {
    disk: Arc<ManagedDisk>,
    owner: ResourceId,
    attachment: ResourceDocument,
    lookup: DiskLookup,
}

impl ManagedDiskReference {
    pub fn disk(&self) -> &Arc<ManagedDisk> {
        &self.disk
    }

    pub fn owner(&self) -> &ResourceId {
        &self.owner
    }

    pub fn lookup(&self) -> DiskLookup {
        self.lookup
    }

    /// Attachment's `managedDisk.storageAccountType`, else the disk SKU.
    pub fn storage_account_type(&self) -> Option<&str> {
        self.attachment
            .str_at(&["managedDisk", "storageAccountType"])
            .or_else(|| self.disk.sku_name())
    }
}

#[async_trait]
impl ArmDisk for ManagedDiskReference {
    fn name(&self) -> &str {
        self.disk.name()
    }

    fn attachment(&self) -> &ResourceDocument {
        &self.attachment
    }

    fn disk_size_gb(&self) -> Option<u64> {
        self.attachment
            .u64_at(&["diskSizeGB"])
            .or_else(|| self.disk.disk_size_gb())
    }

    // Managed disk children belong to the top-level disk resource.
    async fn initialize_children(&mut self) -> Result<()> {
        Ok(())
    }
}
