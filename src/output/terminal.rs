//! Terminal rendering of a loaded subscription.

use crate::models::{ArmDisk, Disk, VirtualMachine};
use crate::subscription::Subscription;
use colored::Colorize;
use itertools::Itertools;

/// One-line description of a disk.
pub fn format_disk(disk: &Disk) -> String {
    let size = disk
        .disk_size_gb()
        .map(|gb| format!("{gb} GB"))
        .unwrap_or_else(|| "? GB".to_string());
    let detail = match disk {
        Disk::Inline(inline) => format!("inline, {size}, {}", inline.vhd_uri().unwrap_or("no vhd uri")),
        Disk::Managed(managed) => format!(
            "managed, {size}, {}",
            managed.storage_account_type().unwrap_or("unknown sku")
        ),
    };
    let lun = disk.lun().map(|l| format!("lun {l} ")).unwrap_or_default();
    format!("{lun}{} ({detail})", disk.name())
}

/// Multi-line, uncoloured description of one VM.
pub fn format_virtual_machine(vm: &VirtualMachine, subscription: &Subscription) -> Vec<String> {
    let size = vm
        .vm_size()
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("{} (unresolved)", vm.vm_size_name().unwrap_or("?")));
    let mut lines = vec![format!(
        "VM '{name}' [{size}] {os} {location} {group}",
        name = vm.name(),
        os = vm.os_type().unwrap_or("?"),
        location = vm.location().unwrap_or("?"),
        group = vm.resource_group_name().unwrap_or("?"),
    )];

    lines.push(format!("  os   : {}", format_disk(vm.os_virtual_hard_disk())));
    for disk in vm.data_disks() {
        lines.push(format!("  data : {}", format_disk(disk)));
    }

    for nic in vm.network_interfaces() {
        let primary = if nic.is_primary() { " *" } else { "" };
        lines.push(format!(
            "  nic  : {}{primary} {}",
            nic.name(),
            nic.private_ip_addresses().iter().join(",")
        ));
    }

    if let Some(set) = vm.availability_set() {
        let members = subscription.availability_set_members(set.id());
        lines.push(format!(
            "  avset: {} ({} members: {})",
            set.name(),
            members.len(),
            members.iter().map(|m| m.name()).join(", ")
        ));
    }
    lines
}

/// Print every VM of the subscription, plus load failures.
pub fn print_topology(subscription: &Subscription) {
    log::info!(
        "#Start print_topology() {} VMs in {}",
        subscription.virtual_machines().len(),
        subscription.subscription_id()
    );
    for vm in subscription.virtual_machines() {
        for (i, line) in format_virtual_machine(vm, subscription).into_iter().enumerate() {
            if i == 0 {
                println!("{}", line.bold());
            } else {
                println!("{line}");
            }
        }
    }
    for failure in subscription.load_failures() {
        println!("{} {failure}", "FAILED".on_red());
    }
}
