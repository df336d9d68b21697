use crate::model::CatalogEntry;
use crate::sources::Source;
use anyhow::Result;
use log::info;

/// The settings table shipped for the host platform.
pub struct BuiltinSource;

impl Source for BuiltinSource {
    fn scan(&self) -> Result<Vec<CatalogEntry>> {
        let entries: Vec<CatalogEntry> = PLATFORM_TABLE
            .iter()
            .map(|(label, token)| CatalogEntry::new(*label, *token))
            .collect();
        info!("BuiltinSource: found {} entries", entries.len());
        Ok(entries)
    }
}

#[cfg(target_os = "windows")]
const PLATFORM_TABLE: &[(&str, &str)] = &[
    // System tools
    ("Device Manager", "devmgmt.msc"),
    ("Disk Management", "diskmgmt.msc"),
    ("System Information", "msinfo32"),
    ("System Configuration (msconfig)", "msconfig"),
    ("Task Manager", "taskmgr"),
    ("Computer Management", "compmgmt.msc"),
    ("Event Viewer", "eventvwr.msc"),
    ("Services", "services.msc"),
    ("Resource Monitor", "resmon"),
    ("Registry Editor", "regedit"),
    ("Group Policy Editor", "gpedit.msc"),
    ("System Properties (Classic)", "sysdm.cpl"),
    ("Date and Time", "timedate.cpl"),
    ("Power Options", "powercfg.cpl"),
    ("Regional Settings", "intl.cpl"),
    ("ODBC Data Sources", "odbcad32.exe"),
    // Network
    ("Network Connections", "ncpa.cpl"),
    ("Windows Defender Firewall", "firewall.cpl"),
    ("Remote Desktop Connection", "mstsc"),
    ("Network Status", "ms-settings:network-status"),
    ("VPN Settings", "ms-settings:network-vpn"),
    ("Proxy Settings", "ms-settings:network-proxy"),
    ("Mobile Hotspot", "ms-settings:network-mobilehotspot"),
    // Security and accounts
    ("Windows Security", "ms-settings:windowsdefender"),
    ("Credential Manager", "credwiz"),
    ("User Accounts (Netplwiz)", "netplwiz"),
    ("Local Users and Groups", "lusrmgr.msc"),
    ("Certificate Manager", "certmgr.msc"),
    ("Accounts (User Info)", "ms-settings:yourinfo"),
    ("Sign-in Options", "ms-settings:signinoptions"),
    // Settings app
    ("About Windows/System", "ms-settings:about"),
    ("Display Settings", "ms-settings:display"),
    ("Sound Settings", "ms-settings:sound"),
    ("Notifications & Focus", "ms-settings:notifications"),
    ("Power & Sleep", "ms-settings:powersleep"),
    ("Storage Settings", "ms-settings:storagesense"),
    ("Troubleshoot Settings", "ms-settings:troubleshoot"),
    ("Update & Security", "ms-settings:windowsupdate"),
    ("Recovery Options", "ms-settings:recovery"),
    ("Privacy & Security", "ms-settings:privacy"),
    ("Personalization", "ms-settings:personalization"),
    ("Time & Language", "ms-settings:dateandtime"),
    ("Gaming (Xbox Game Bar)", "ms-settings:gaming-gamebar"),
    // Apps and devices
    ("Apps & Features", "ms-settings:appsfeatures"),
    ("Default Apps", "ms-settings:defaultapps"),
    ("Optional Features", "ms-settings:optionalfeatures"),
    ("Programs and Features (Classic)", "appwiz.cpl"),
    ("Bluetooth & Devices", "ms-settings:bluetooth"),
    ("Printers & Scanners", "ms-settings:printers"),
    ("Mouse & Touchpad", "ms-settings:mousetouchpad"),
    ("Keyboard Settings", "ms-settings:keyboard"),
    ("Mouse Properties (main.cpl)", "main.cpl"),
    // Accessibility and accessories
    ("Magnifier", "magnify"),
    ("On-Screen Keyboard", "osk"),
    ("Narrator", "narrator"),
    ("Accessibility - Mouse", "ms-settings:easeofaccess-mouse"),
    ("Calculator", "calc"),
    ("Notepad", "notepad"),
    ("Administrative Tools Folder", "control admintools"),
    ("Indexing Options", "searchindexer.exe"),
    ("Color Management", "colorcpl"),
];

#[cfg(target_os = "macos")]
const PLATFORM_TABLE: &[(&str, &str)] = &[
    ("System Settings", "/System/Applications/System Settings.app"),
    ("Network", "x-apple.systempreferences:com.apple.Network-Settings.extension"),
    ("Bluetooth", "x-apple.systempreferences:com.apple.BluetoothSettings"),
    ("Sound", "x-apple.systempreferences:com.apple.Sound-Settings.extension"),
    ("Displays", "x-apple.systempreferences:com.apple.Displays-Settings.extension"),
    ("Keyboard", "x-apple.systempreferences:com.apple.Keyboard-Settings.extension"),
    ("Trackpad", "x-apple.systempreferences:com.apple.Trackpad-Settings.extension"),
    ("Privacy & Security", "x-apple.systempreferences:com.apple.settings.PrivacySecurity.extension"),
    ("Date & Time", "x-apple.systempreferences:com.apple.Date-Time-Settings.extension"),
    ("Users & Groups", "x-apple.systempreferences:com.apple.Users-Groups-Settings.extension"),
    ("Software Update", "x-apple.systempreferences:com.apple.Software-Update-Settings.extension"),
    ("Activity Monitor", "/System/Applications/Utilities/Activity Monitor.app"),
    ("Disk Utility", "/System/Applications/Utilities/Disk Utility.app"),
    ("Console", "/System/Applications/Utilities/Console.app"),
    ("System Information", "/System/Applications/Utilities/System Information.app"),
    ("Terminal", "/System/Applications/Utilities/Terminal.app"),
    ("Calculator", "/System/Applications/Calculator.app"),
    ("Flush DNS Cache", "dscacheutil -flushcache"),
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const PLATFORM_TABLE: &[(&str, &str)] = &[
    // GNOME settings panels
    ("Settings", "gnome-control-center"),
    ("Display Settings", "gnome-control-center display"),
    ("Sound Settings", "gnome-control-center sound"),
    ("Network Settings", "gnome-control-center network"),
    ("Wi-Fi", "gnome-control-center wifi"),
    ("Bluetooth", "gnome-control-center bluetooth"),
    ("Power", "gnome-control-center power"),
    ("Date and Time", "gnome-control-center datetime"),
    ("Users", "gnome-control-center users"),
    ("Keyboard Settings", "gnome-control-center keyboard"),
    ("Mouse & Touchpad", "gnome-control-center mouse"),
    ("Printers", "gnome-control-center printers"),
    ("Privacy", "gnome-control-center privacy"),
    ("Default Apps", "gnome-control-center default-apps"),
    ("About This System", "gnome-control-center info-overview"),
    // Standalone tools
    ("Network Connections", "nm-connection-editor"),
    ("Volume Control", "pavucontrol"),
    ("Printer Configuration", "system-config-printer"),
    ("Firewall", "firewall-config"),
    ("Disks", "gnome-disks"),
    ("Disk Usage Analyzer", "baobab"),
    ("System Monitor", "gnome-system-monitor"),
    ("Logs", "gnome-logs"),
    ("Font Viewer", "gnome-font-viewer"),
    ("Calculator", "gnome-calculator"),
    ("Text Editor", "gnome-text-editor"),
    ("Terminal Task Manager (top)", "x-terminal-emulator -e top"),
    // Locations
    ("System Configuration Folder", "file:///etc"),
    ("Autostart Entries", "file:///etc/xdg/autostart"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn platform_table_labels_are_unique() {
        let entries = BuiltinSource.scan().unwrap();
        let labels: HashSet<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels.len(), entries.len());
    }

    #[test]
    fn platform_table_has_no_blank_tokens() {
        let entries = BuiltinSource.scan().unwrap();
        assert!(!entries.is_empty());
        assert!(entries.iter().all(|e| !e.token.trim().is_empty()));
    }
}
