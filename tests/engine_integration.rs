//! Integration tests for the workflow engine and plugin runtime.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use stagegate::hooks::{HookHandler, HookOutcome, HookRegistry, HookType};
use stagegate::plugin::{
    ManifestHook, ManifestSteering, ManifestTool, PluginManager, PluginManifest,
    StaticHandlerResolver, StaticManifestSource,
};
use stagegate::steering::{SteeringContext, SteeringMode, SteeringRegistry};
use stagegate::store::{FileStateStore, MemoryStateStore};
use stagegate::tools::{ToolContext, ToolHandler, ToolRegistry};
use stagegate::workflow::{
    ApprovalStatus, Phase, WorkflowError, WorkflowStateMachine, WorkflowStatus, POST_PHASE_HOOK,
};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn engine() -> (Arc<HookRegistry>, Arc<ToolRegistry>, Arc<SteeringRegistry>, PluginManager) {
    let hooks = Arc::new(HookRegistry::new());
    let tools = Arc::new(ToolRegistry::new());
    let steering = Arc::new(SteeringRegistry::new());
    let manager =
        PluginManager::new(Arc::clone(&hooks), Arc::clone(&tools), Arc::clone(&steering));
    (hooks, tools, steering, manager)
}

fn demo_manifest() -> PluginManifest {
    PluginManifest {
        id: "demo".to_string(),
        version: "1.0.0".to_string(),
        description: Some("Demo plugin".to_string()),
        hooks: vec![ManifestHook {
            name: "transition-audit".to_string(),
            hook_type: HookType::Observer,
            extension_point: POST_PHASE_HOOK.to_string(),
            priority: 100,
            conditions: Vec::new(),
            handler: "audit".to_string(),
        }],
        tools: vec![ManifestTool {
            name: "word-count".to_string(),
            description: "Count words in a text".to_string(),
            category: "analysis".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            }),
            output_schema: None,
            permissions: Vec::new(),
            handler: "word_count".to_string(),
        }],
        steering: vec![ManifestSteering {
            name: "rust-style".to_string(),
            doc_type: "style".to_string(),
            mode: SteeringMode::Conditional,
            priority: 10,
            patterns: vec!["**/*.rs".to_string()],
            template: "Follow {{edition}} idioms.".to_string(),
            variables: vec![stagegate::SteeringVariable::optional("edition")
                .with_default(json!("2021"))],
        }],
    }
}

fn demo_resolver(audit_counter: Arc<AtomicUsize>) -> StaticHandlerResolver {
    let mut resolver = StaticHandlerResolver::new();

    let audit: HookHandler = Arc::new(move |_, _| {
        audit_counter.fetch_add(1, Ordering::SeqCst);
        Ok(HookOutcome::unchanged())
    });
    resolver.add_hook_handler("demo", "audit", audit);

    let word_count: ToolHandler = Arc::new(|input, _| {
        let text = input["text"].as_str().unwrap_or_default();
        Ok(json!({"words": text.split_whitespace().count()}))
    });
    resolver.add_tool_handler("demo", "word_count", word_count);

    resolver
}

#[tokio::test]
async fn test_full_phase_walk_for_project() {
    init_tracing();
    let store = Arc::new(MemoryStateStore::new());
    let hooks = Arc::new(HookRegistry::new());
    let machine = WorkflowStateMachine::new(store, hooks);

    let mut state = machine.initialize("P").await.unwrap();
    assert_eq!(state.current_phase, Phase::Init);
    assert_eq!(state.status, WorkflowStatus::InProgress);

    machine.approve_phase(&mut state, Phase::Init).await.unwrap();
    assert_eq!(state.phase(Phase::Init).status, ApprovalStatus::Approved);

    machine.progress_to_phase(&mut state, Phase::Requirements).await.unwrap();
    assert_eq!(state.current_phase, Phase::Requirements);

    // Progressing before approving the current phase fails.
    let result = machine.progress_to_phase(&mut state, Phase::Design).await;
    assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_state_survives_machine_instances() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    {
        let store = Arc::new(FileStateStore::new(dir.path()).unwrap());
        let machine = WorkflowStateMachine::new(store, Arc::new(HookRegistry::new()));
        let mut state = machine.initialize("/srv/app").await.unwrap();
        machine.approve_phase(&mut state, Phase::Init).await.unwrap();
        machine.progress_to_phase(&mut state, Phase::Requirements).await.unwrap();
    }

    // A new machine over the same directory sees the persisted record.
    let store = Arc::new(FileStateStore::new(dir.path()).unwrap());
    let machine = WorkflowStateMachine::new(store, Arc::new(HookRegistry::new()));

    let state = machine.load("/srv/app").await.unwrap();
    assert_eq!(state.current_phase, Phase::Requirements);
    assert!(state.is_phase_approved(Phase::Init));
    assert!(state.gates_satisfied());

    let result = machine.initialize("/srv/app").await;
    assert!(matches!(result, Err(WorkflowError::AlreadyInitialized(_))));
}

#[tokio::test]
async fn test_rollback_roundtrip_restores_position() {
    init_tracing();
    let store = Arc::new(MemoryStateStore::new());
    let machine = WorkflowStateMachine::new(store, Arc::new(HookRegistry::new()));

    let mut state = machine.initialize("P").await.unwrap();
    for target in [Phase::Requirements, Phase::Design, Phase::Tasks] {
        let current = state.current_phase;
        machine.approve_phase(&mut state, current).await.unwrap();
        machine.progress_to_phase(&mut state, target).await.unwrap();
    }
    let original = state.current_phase;

    machine.rollback_to_phase(&mut state, Phase::Requirements, "scope change").await.unwrap();
    assert_eq!(state.current_phase, Phase::Requirements);
    assert!(state.gates_satisfied());

    // Re-approve forward; the workflow lands back where it was, with all
    // intermediate phases approved.
    for target in [Phase::Design, Phase::Tasks] {
        let current = state.current_phase;
        machine.approve_phase(&mut state, current).await.unwrap();
        machine.progress_to_phase(&mut state, target).await.unwrap();
    }
    assert_eq!(state.current_phase, original);
    assert!(state.is_phase_approved(Phase::Requirements));
    assert!(state.is_phase_approved(Phase::Design));
}

#[tokio::test]
async fn test_plugin_lifecycle_end_to_end() {
    init_tracing();
    let (hooks, tools, steering, manager) = engine();
    let audits = Arc::new(AtomicUsize::new(0));

    // Quiescent load: wire plugins before any requests execute.
    let source = StaticManifestSource::new(vec![demo_manifest()]);
    let resolver = demo_resolver(Arc::clone(&audits));
    let loaded = manager.initialize(&source, &resolver).await.unwrap();
    assert_eq!(loaded, 1);

    // The plugin's hook observes workflow transitions.
    let store = Arc::new(MemoryStateStore::new());
    let machine = WorkflowStateMachine::new(store, Arc::clone(&hooks));
    let mut state = machine.initialize("P").await.unwrap();
    machine.approve_phase(&mut state, Phase::Init).await.unwrap();
    machine.progress_to_phase(&mut state, Phase::Requirements).await.unwrap();
    assert_eq!(audits.load(Ordering::SeqCst), 1);

    // The plugin's tool executes with schema validation.
    let execution = tools
        .execute("word-count", json!({"text": "one two three"}), &ToolContext::new())
        .unwrap();
    assert!(execution.success);
    assert_eq!(execution.output, Some(json!({"words": 3})));

    let invalid = tools.execute("word-count", json!({}), &ToolContext::new());
    assert!(invalid.is_err());

    // The plugin's steering document resolves for matching files only.
    let docs =
        steering.applicable_documents(&SteeringContext::new().with_file("src/lib.rs"));
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].content, "Follow 2021 idioms.");
    assert!(steering
        .applicable_documents(&SteeringContext::new().with_file("README.md"))
        .is_empty());

    // Quiescent unload removes every contribution at once.
    let summary = manager.clear_plugin("demo").unwrap();
    assert_eq!((summary.hooks, summary.tools, summary.steering), (1, 1, 1));

    machine.approve_phase(&mut state, Phase::Requirements).await.unwrap();
    machine.progress_to_phase(&mut state, Phase::Design).await.unwrap();
    assert_eq!(audits.load(Ordering::SeqCst), 1);
    assert!(tools.get("word-count").is_none());
}

#[tokio::test]
async fn test_duplicate_tool_registration_keeps_latest() {
    init_tracing();
    let (_, tools, _, _) = engine();

    let first: ToolHandler = Arc::new(|_, _| Ok(json!("first")));
    tools.register(stagegate::ToolDefinition::new("plugin-a", "t1", first));

    let second: ToolHandler = Arc::new(|_, _| Ok(json!("second")));
    tools.register(stagegate::ToolDefinition::new("plugin-a", "t1", second));

    let all = tools.all_tools();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "t1");

    let execution = tools.execute("t1", json!({}), &ToolContext::new()).unwrap();
    assert_eq!(execution.output, Some(json!("second")));
}

#[tokio::test]
async fn test_distinct_projects_are_independent() {
    init_tracing();
    let store = Arc::new(MemoryStateStore::new());
    let machine = WorkflowStateMachine::new(store, Arc::new(HookRegistry::new()));

    let mut a = machine.initialize("/projects/a").await.unwrap();
    let b = machine.initialize("/projects/b").await.unwrap();

    machine.approve_phase(&mut a, Phase::Init).await.unwrap();
    machine.progress_to_phase(&mut a, Phase::Requirements).await.unwrap();

    let b_reloaded = machine.load("/projects/b").await.unwrap();
    assert_eq!(b.current_phase, Phase::Init);
    assert_eq!(b_reloaded.current_phase, Phase::Init);
    assert_eq!(b_reloaded.phase(Phase::Init).status, ApprovalStatus::InProgress);
}
