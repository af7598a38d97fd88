//! 批处理流水线测试
//!
//! 覆盖：安全过滤、名称去重、批处理统计、订阅容器、Clash / sing-box 渲染、YAML 配置

#![cfg(test)]

use crate::render::singbox::{outbound, singbox_document};
use crate::render::{render_clash, render_singbox};
use crate::subscription::{encode_subscription, unwrap_container};
use crate::{
    Deduplicator, FailureKind, NodeRecord, RejectReason, SafetyPolicy, Scheme, SieveConfig,
    SieveError, Verdict, dedup_names, is_safe_endpoint, parse_link, process_lines, process_text,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_test::{Token, assert_tokens};

const END_TO_END: &str = "vless://uuid1@1.2.3.4:443?security=tls&type=ws#Node1\n\
                          trojan://pw@5.6.7.8:443?sni=example.com#Node1";

fn node(link: &str) -> NodeRecord {
    parse_link(link).unwrap_or_else(|e| panic!("{} should parse: {}", link, e))
}

fn numbered_nodes(count: usize) -> Vec<NodeRecord> {
    (0..count)
        .map(|i| node(&format!("vless://id{i}@n{i}.example.com:443?security=tls#N{i}")))
        .collect()
}

// =============================================================================
// 安全过滤
// =============================================================================

#[test]
fn safety_denied_port_and_private_prefix() {
    assert!(!is_safe_endpoint(3306, "8.8.8.8"));
    assert!(!is_safe_endpoint(443, "10.0.0.5"));
    assert!(is_safe_endpoint(443, "8.8.8.8"));
    // 前缀匹配是文本级别的
    assert!(!is_safe_endpoint(443, "172.217.0.1"));
    assert!(is_safe_endpoint(443, "1.10.0.1"));
}

#[test]
fn safety_policy_reports_matching_rule() {
    let policy = SafetyPolicy::default();
    assert_eq!(
        policy.evaluate(22, "192.168.1.1"),
        Verdict::Reject(RejectReason::DeniedPort { port: 22 })
    );
    assert_eq!(
        policy.evaluate(443, " 127.0.0.1"),
        Verdict::Reject(RejectReason::PrivateAddress {
            prefix: "127.".to_string()
        })
    );
    assert!(policy.is_safe(8443, "example.com"));
}

#[test]
fn safety_policy_agrees_with_builtin_check() {
    let policy = SafetyPolicy::default();
    for (port, server) in [
        (443, "8.8.8.8"),
        (3389, "8.8.8.8"),
        (443, "192.168.0.1"),
        (5432, "db.example.com"),
        (80, "172.16.0.1"),
    ] {
        assert_eq!(policy.is_safe(port, server), is_safe_endpoint(port, server));
    }
}

#[test]
fn reject_reason_display() {
    assert_eq!(
        RejectReason::DeniedPort { port: 23 }.to_string(),
        "denied port 23"
    );
    assert!(
        RejectReason::PrivateAddress {
            prefix: "10.".into()
        }
        .to_string()
        .contains("10.")
    );
}

// =============================================================================
// 名称去重
// =============================================================================

#[test]
fn dedup_appends_suffix_once() {
    let records = vec![
        node("vless://a@h1:443#X"),
        node("vless://b@h2:443#X"),
        node("vless://c@h3:443#Y"),
    ];
    let names: Vec<_> = dedup_names(records)
        .into_iter()
        .map(|n| n.name)
        .collect();
    assert_eq!(names, ["X", "X-2", "Y"]);
}

#[test]
fn dedup_suffix_does_not_increment() {
    let records = vec![
        node("vless://a@h1:443#X"),
        node("vless://b@h2:443#X"),
        node("vless://c@h3:443#X"),
    ];
    let names: Vec<_> = dedup_names(records)
        .into_iter()
        .map(|n| n.name)
        .collect();
    assert_eq!(names, ["X", "X-2", "X-2"]);
}

#[test]
fn dedup_keeps_everything_by_default() {
    let same = node("trojan://pw@h:443#T");
    let outcome = Deduplicator::default().run(vec![same.clone(), same.clone()]);
    assert_eq!(outcome.nodes.len(), 2);
    assert_eq!(outcome.dropped, 0);

    let outcome = Deduplicator::new(true).run(vec![same.clone(), same.clone()]);
    assert_eq!(outcome.nodes, vec![same]);
    assert_eq!(outcome.dropped, 1);
}

// =============================================================================
// 批处理
// =============================================================================

#[test]
fn batch_end_to_end() {
    let batch = process_text(END_TO_END, &SieveConfig::default());
    let names: Vec<_> = batch.nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["Node1", "Node1-2"]);
    assert_eq!(batch.nodes[0].scheme, Scheme::VLess);
    assert_eq!(batch.nodes[1].scheme, Scheme::Trojan);
    assert!(batch.failures.is_empty());
    assert!(batch.rejections.is_empty());
}

#[test]
fn batch_skips_blank_and_comment_lines() {
    let text = "\n   \n# comment line\nvless://id@8.8.8.8:443#A\n\t\n";
    let summary = process_text(text, &SieveConfig::default()).summary();
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.rejected, 0);
}

#[test]
fn batch_failures_and_rejections_do_not_stop_processing() {
    let lines = [
        "ssr://not-supported",
        "vless://u@10.0.0.5:443#lan",
        "vmess://not-valid-base64!!!",
        "vless://u@8.8.8.8:3306#db",
        "vless://u@8.8.8.8:443#ok",
    ];
    let batch = process_lines(lines, &SieveConfig::default());

    assert_eq!(batch.nodes.len(), 1);
    assert_eq!(batch.nodes[0].name, "ok");

    let kinds: Vec<_> = batch.failures.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, [FailureKind::UnknownScheme, FailureKind::Decode]);

    let reasons: Vec<_> = batch.rejections.iter().map(|r| r.reason.clone()).collect();
    assert_eq!(
        reasons,
        [
            RejectReason::PrivateAddress {
                prefix: "10.".to_string()
            },
            RejectReason::DeniedPort { port: 3306 },
        ]
    );
}

#[test]
fn batch_rejected_nodes_do_not_reserve_names() {
    let lines = ["vless://u@10.0.0.5:443#X", "vless://u@8.8.8.8:443#X"];
    let batch = process_lines(lines, &SieveConfig::default());
    assert_eq!(batch.nodes[0].name, "X");
}

#[test]
fn batch_failure_preview_is_truncated() {
    let long = format!("ssr://{}", "a".repeat(200));
    let batch = process_lines([long.as_str()], &SieveConfig::default());
    let failure = &batch.failures[0];
    assert_eq!(failure.line_preview, format!("{}...", &long[..50]));
    assert!(failure.reason.starts_with("unknown scheme"));

    let config = SieveConfig {
        preview_len: 8,
        ..SieveConfig::default()
    };
    let batch = process_lines([long.as_str()], &config);
    assert_eq!(batch.failures[0].line_preview, "ssr://aa...");
}

#[test]
fn batch_drop_identical_counts_in_summary() {
    let text = "vless://u@8.8.8.8:443#X\nvless://u@8.8.8.8:443#X\nvless://v@8.8.4.4:443#X";
    let config = SieveConfig {
        drop_identical: true,
        ..SieveConfig::default()
    };
    let batch = process_text(text, &config);
    let names: Vec<_> = batch.nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["X", "X-2"]);
    assert_eq!(batch.summary().dropped_duplicates, 1);
}

#[test]
fn batch_report_serializes_to_json() {
    let lines = ["ssr://x", "vless://u@192.168.1.2:443#lan", "vless://u@8.8.8.8:443#ok"];
    let batch = process_lines(lines, &SieveConfig::default());
    let report = serde_json::to_value(batch.report()).unwrap();

    assert_eq!(report["summary"]["accepted"], 1);
    assert_eq!(report["summary"]["failed"], 1);
    assert_eq!(report["summary"]["rejected"], 1);
    assert_eq!(report["failures"][0]["kind"], "unknown_scheme");
    assert_eq!(report["rejections"][0]["reason"]["rule"], "private_address");
    assert_eq!(report["rejections"][0]["reason"]["prefix"], "192.168.");
    assert_eq!(report["rejections"][0]["scheme"], "vless");
}

// =============================================================================
// 订阅容器
// =============================================================================

#[test]
fn subscription_base64_container_is_unwrapped() {
    let blob = STANDARD.encode(END_TO_END);
    let text = unwrap_container(&blob);
    assert_eq!(text, END_TO_END);
    assert_eq!(process_text(&text, &SieveConfig::default()).nodes.len(), 2);
}

#[test]
fn subscription_non_utf8_base64_passes_through() {
    let blob = STANDARD.encode([0xffu8, 0xfe]);
    assert_eq!(blob, "//4=");
    assert_eq!(unwrap_container(&blob), blob);
}

#[test]
fn subscription_plain_text_passes_through() {
    assert_eq!(unwrap_container(END_TO_END), END_TO_END);
    assert_eq!(unwrap_container(""), "");
}

#[test]
fn subscription_encoding_reparses_to_same_nodes() {
    let batch = process_text(END_TO_END, &SieveConfig::default());
    let encoded = encode_subscription(&batch.nodes);

    assert_eq!(encoded.plain.lines().count(), 2);
    assert_eq!(
        STANDARD.decode(&encoded.base64).unwrap(),
        encoded.plain.as_bytes()
    );

    let again = process_text(&unwrap_container(&encoded.base64), &SieveConfig::default());
    assert_eq!(again.nodes, batch.nodes);
}

// =============================================================================
// Clash 渲染
// =============================================================================

#[test]
fn clash_groups_respect_auto_limit() {
    let nodes = numbered_nodes(12);
    let yaml = render_clash(&nodes, 10).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

    let proxies = doc["proxies"].as_sequence().unwrap();
    assert_eq!(proxies.len(), 12);

    let groups = doc["proxy-groups"].as_sequence().unwrap();
    assert_eq!(groups[0]["name"].as_str(), Some("Auto"));
    assert_eq!(groups[0]["type"].as_str(), Some("url-test"));
    assert_eq!(groups[0]["proxies"].as_sequence().unwrap().len(), 10);
    assert_eq!(groups[1]["name"].as_str(), Some("Balance"));
    assert_eq!(groups[1]["type"].as_str(), Some("load-balance"));
    assert_eq!(groups[1]["proxies"].as_sequence().unwrap().len(), 12);

    let rules = doc["rules"].as_sequence().unwrap();
    assert_eq!(rules.last().and_then(|r| r.as_str()), Some("MATCH,Auto"));
}

#[test]
fn clash_proxy_fields_per_scheme() {
    let nodes = vec![
        node("trojan://pw@5.6.7.8:443?sni=example.com#T"),
        node("ss://aes-256-gcm:secret@9.9.9.9:8388#S"),
        node("vless://uuid1@1.2.3.4:443?security=tls&type=ws&path=%2Fx&sni=cdn.example.com#V"),
    ];
    let yaml = render_clash(&nodes, 10).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    let proxies = &doc["proxies"];

    assert_eq!(proxies[0]["type"].as_str(), Some("trojan"));
    assert_eq!(proxies[0]["password"].as_str(), Some("pw"));
    assert_eq!(proxies[0]["sni"].as_str(), Some("example.com"));

    assert_eq!(proxies[1]["type"].as_str(), Some("ss"));
    assert_eq!(proxies[1]["cipher"].as_str(), Some("aes-256-gcm"));
    assert_eq!(proxies[1]["port"].as_u64(), Some(8388));

    assert_eq!(proxies[2]["type"].as_str(), Some("vless"));
    assert_eq!(proxies[2]["network"].as_str(), Some("ws"));
    assert_eq!(proxies[2]["ws-opts"]["path"].as_str(), Some("/x"));
    assert_eq!(
        proxies[2]["ws-opts"]["headers"]["Host"].as_str(),
        Some("cdn.example.com")
    );
    assert_eq!(proxies[2]["tls"].as_bool(), Some(true));
}

#[test]
fn clash_translates_obfs_plugin() {
    let nodes = vec![node(
        "ss://aes-256-gcm:pw@1.1.1.1:8388/?plugin=obfs-local%3Bobfs%3Dhttp%3Bobfs-host%3Dx.com#S",
    )];
    let yaml = render_clash(&nodes, 10).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    let proxy = &doc["proxies"][0];

    assert_eq!(proxy["plugin"].as_str(), Some("obfs"));
    assert_eq!(proxy["plugin-opts"]["mode"].as_str(), Some("http"));
    assert_eq!(proxy["plugin-opts"]["host"].as_str(), Some("x.com"));
}

#[test]
fn clash_translates_v2ray_plugin() {
    let nodes = vec![node(
        "ss://aes-256-gcm:pw@1.1.1.1:443/?plugin=v2ray-plugin%3Btls%3Bhost%3Dcdn.example.com%3Bpath%3D%2Fws#V",
    )];
    let yaml = render_clash(&nodes, 10).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    let opts = &doc["proxies"][0]["plugin-opts"];

    assert_eq!(doc["proxies"][0]["plugin"].as_str(), Some("v2ray-plugin"));
    assert_eq!(opts["mode"].as_str(), Some("websocket"));
    assert_eq!(opts["host"].as_str(), Some("cdn.example.com"));
    assert_eq!(opts["path"].as_str(), Some("/ws"));
    assert_eq!(opts["tls"].as_bool(), Some(true));
}

#[test]
fn clash_omits_unsupported_plugin() {
    let nodes = vec![node(
        "ss://aes-256-gcm:pw@1.1.1.1:8388/?plugin=kcptun%3Bmode%3Dfast#K",
    )];
    let yaml = render_clash(&nodes, 10).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    let proxy = doc["proxies"][0].as_mapping().unwrap();

    assert!(!proxy.contains_key("plugin"));
    assert!(!proxy.contains_key("plugin-opts"));
}

#[test]
fn clash_names_never_shadow_groups_or_builtins() {
    let nodes = vec![
        node("vless://a@8.8.8.8:443#Auto"),
        node("vless://b@8.8.4.4:443#DIRECT"),
        node("vless://c@1.1.1.1:443#Auto-2"),
    ];
    let yaml = render_clash(&nodes, 10).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

    let names: Vec<_> = doc["proxies"]
        .as_sequence()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Auto-2", "DIRECT-2", "Auto-2-2"]);
    assert_eq!(
        doc["proxy-groups"][1]["proxies"],
        serde_yaml::to_value(&names).unwrap()
    );
}

#[test]
fn clash_empty_list_still_renders_groups() {
    let yaml = render_clash(&[], 10).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(doc["proxy-groups"].as_sequence().unwrap().len(), 2);
}

// =============================================================================
// sing-box 渲染
// =============================================================================

#[test]
fn singbox_selector_lists_every_node_and_direct() {
    let nodes = numbered_nodes(3);
    let doc = singbox_document(&nodes);
    let outbounds = doc["outbounds"].as_array().unwrap();

    assert_eq!(outbounds.len(), 5);
    assert_eq!(outbounds[0]["type"], "selector");
    assert_eq!(outbounds[0]["tag"], "proxy");
    assert_eq!(
        outbounds[0]["outbounds"],
        serde_json::json!(["N0", "N1", "N2", "direct"])
    );
    assert_eq!(outbounds[4]["type"], "direct");
    assert_eq!(doc["route"]["final"], "proxy");
    assert_eq!(doc["log"]["level"], "info");
    assert_eq!(doc["dns"]["servers"][0]["address"], "8.8.8.8");
}

#[test]
fn singbox_tags_never_collide_with_builtin_outbounds() {
    let nodes = vec![
        node("vless://u@8.8.8.8:443#direct"),
        node("vless://u@8.8.4.4:443#proxy"),
    ];
    let doc = singbox_document(&nodes);
    let tags: Vec<_> = doc["outbounds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["tag"].as_str().unwrap())
        .collect();

    assert_eq!(tags, ["proxy", "direct-2", "proxy-2", "direct"]);
    assert_eq!(
        doc["outbounds"][0]["outbounds"],
        serde_json::json!(["direct-2", "proxy-2", "direct"])
    );
}

#[test]
fn singbox_tags_unique_after_repeated_suffix() {
    let nodes = vec![
        node("vless://a@8.8.8.8:443#X"),
        node("vless://b@8.8.4.4:443#X"),
        node("vless://c@1.1.1.1:443#X"),
    ];
    let named = dedup_names(nodes);
    let doc = singbox_document(&named);
    assert_eq!(
        doc["outbounds"][0]["outbounds"],
        serde_json::json!(["X", "X-2", "X-2-2", "direct"])
    );
}

#[test]
fn singbox_shadowsocks_plugin_split_into_name_and_opts() {
    let record = node(
        "ss://aes-256-gcm:pw@1.1.1.1:8388/?plugin=obfs-local%3Bobfs%3Dhttp%3Bobfs-host%3Dx.com#S",
    );
    let out = outbound(&record);
    assert_eq!(out["type"], "shadowsocks");
    assert_eq!(out["tag"], "S");
    assert_eq!(out["plugin"], "obfs-local");
    assert_eq!(out["plugin_opts"], "obfs=http;obfs-host=x.com");
}

#[test]
fn singbox_outbound_carries_transport_and_tls() {
    let nodes = vec![node(
        "vless://uuid1@1.2.3.4:443?security=tls&type=ws&path=%2Fx&sni=cdn.example.com#V",
    )];
    let json = render_singbox(&nodes).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
    let out = &doc["outbounds"][1];

    assert_eq!(out["type"], "vless");
    assert_eq!(out["tag"], "V");
    assert_eq!(out["server"], "1.2.3.4");
    assert_eq!(out["server_port"], 443);
    assert_eq!(out["uuid"], "uuid1");
    assert_eq!(out["tls"]["enabled"], true);
    assert_eq!(out["tls"]["server_name"], "cdn.example.com");
    assert_eq!(out["transport"]["type"], "ws");
    assert_eq!(out["transport"]["path"], "/x");
}

// =============================================================================
// 配置
// =============================================================================

#[test]
fn config_partial_yaml_keeps_defaults() {
    let config = SieveConfig::from_yaml_str("preview_len: 10\nsafety:\n  denied_ports: [8080]\n")
        .unwrap();
    assert_eq!(config.preview_len, 10);
    assert_eq!(config.auto_group_limit, 10);
    assert!(!config.drop_identical);
    assert_eq!(config.safety.denied_ports, vec![8080]);
    assert_eq!(
        config.safety.private_prefixes,
        SafetyPolicy::default().private_prefixes
    );
    assert!(config.safety.is_safe(3306, "8.8.8.8"));
    assert!(!config.safety.is_safe(8080, "8.8.8.8"));
}

#[test]
fn config_empty_and_invalid_yaml() {
    assert_eq!(
        SieveConfig::from_yaml_str("  \n").unwrap(),
        SieveConfig::default()
    );
    assert!(matches!(
        SieveConfig::from_yaml_str("preview_len: [not a number"),
        Err(SieveError::Config(_))
    ));
}

#[test]
fn config_load_missing_file_names_path() {
    let err = SieveConfig::load(std::path::Path::new("/nonexistent/subsift.yaml")).unwrap_err();
    assert!(matches!(err, SieveError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/subsift.yaml"));
}

// =============================================================================
// 序列化
// =============================================================================

#[test]
fn scheme_serde_tokens() {
    assert_tokens(
        &Scheme::VLess,
        &[Token::UnitVariant {
            name: "Scheme",
            variant: "vless",
        }],
    );
    assert_tokens(
        &Scheme::Shadowsocks,
        &[Token::UnitVariant {
            name: "Scheme",
            variant: "shadowsocks",
        }],
    );
}

#[test]
fn failure_kind_serde_tokens() {
    assert_tokens(
        &FailureKind::StructuralMismatch,
        &[Token::UnitVariant {
            name: "FailureKind",
            variant: "structural_mismatch",
        }],
    );
}
