//! Built-in resource `resource://system/info`

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::capability::{Capability, CapabilityBuilder};
use crate::error::RegistryError;
use crate::protocol::{CapabilityResult, ResourceContent};

pub const SYSTEM_INFO_URI: &str = "resource://system/info";

pub fn system_info() -> Result<Capability, RegistryError> {
    CapabilityBuilder::resource(SYSTEM_INFO_URI)
        .name("system_info")
        .description("系统信息")
        .mime_type("text/plain")
        .handler_no_params(|| async {
            // The process table refresh does blocking syscalls
            let memory = tokio::task::spawn_blocking(resident_memory_mb)
                .await
                .ok()
                .flatten();
            Ok(CapabilityResult::resource(ResourceContent {
                uri: SYSTEM_INFO_URI.to_string(),
                mime_type: Some("text/plain".to_string()),
                text: snapshot(memory),
            }))
        })
        .build()
}

/// Resident memory of this process in MB, if the platform reports it
fn resident_memory_mb() -> Option<u64> {
    let pid = Pid::from_u32(std::process::id());
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::everything(),
    );
    sys.process(pid).map(|p| p.memory() / 1_048_576)
}

fn snapshot(memory_mb: Option<u64>) -> String {
    let memory = memory_mb
        .map(|mb| format!("{}MB", mb))
        .unwrap_or_else(|| "未知".to_string());
    format!(
        "系统信息:\n- 平台: {} ({})\n- 运行时: {} {}\n- 内存使用: {}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        memory
    )
}

pub fn all() -> Result<Vec<Capability>, RegistryError> {
    Ok(vec![system_info()?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Content;
    use serde_json::json;

    #[tokio::test]
    async fn test_system_info_snapshot() {
        let resource = system_info().unwrap();
        let def = resource.definition();
        assert_eq!(def.uri.as_deref(), Some(SYSTEM_INFO_URI));
        assert_eq!(def.name, "system_info");
        assert_eq!(def.mime_type.as_deref(), Some("text/plain"));

        let result = resource.invoke(json!({})).await.unwrap();
        let Content::Resource { resource: body } = &result.content[0] else {
            panic!("expected resource content");
        };
        assert_eq!(body.uri, SYSTEM_INFO_URI);
        assert!(body.text.starts_with("系统信息:\n- 平台: "));
        assert!(body.text.contains(std::env::consts::OS));
        assert!(body.text.contains("- 内存使用: "));
    }

    #[test]
    fn test_snapshot_memory_line() {
        assert!(snapshot(Some(42)).ends_with("- 内存使用: 42MB"));
        assert!(snapshot(None).ends_with("- 内存使用: 未知"));
    }
}
