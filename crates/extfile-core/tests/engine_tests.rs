//! SyncEngine behaviour against a real resource directory

use std::time::{Duration, SystemTime};

use extfile_core::{
    ContentBinding, ContentKind, LoadConflictChoice, LoadStatus, NamingMode, ProjectSession,
    PromptRecord, SaveConflictChoice, SaveStatus, ScriptedPrompter, Settings, SyncEngine,
    TreePosition, XmlElement,
};
use extfile_fs::ResourceLayout;
use extfile_test_utils::TestProject;
use pretty_assertions::assert_eq;

fn session(project: &TestProject, settings: Settings, prompter: ScriptedPrompter) -> ProjectSession<ScriptedPrompter> {
    ProjectSession::new(
        settings,
        ResourceLayout::for_project(project.project_path(), "-resources"),
        prompter,
    )
}

fn step() -> TreePosition {
    TreePosition::project("P")
        .with_suite("S")
        .with_case("C")
        .with_step("T")
}

fn groovy_engine(attrs: &str, script: &str) -> SyncEngine {
    let config = XmlElement::parse(&format!(
        "<con:config><script{attrs}><![CDATA[{script}]]></script></con:config>"
    ))
    .unwrap();
    SyncEngine::new(
        ContentKind::script(),
        ContentBinding::container_script(Some(config), "con:config"),
    )
}

fn request_engine(attrs: &str, body: &str) -> SyncEngine {
    let config = XmlElement::parse(&format!(
        "<con:config><con:request name=\"T\"{attrs}><con:request><![CDATA[{body}]]></con:request></con:request></con:config>"
    ))
    .unwrap();
    SyncEngine::new(ContentKind::request(), ContentBinding::request(Some(config)))
}

#[test]
fn inline_only_holder_never_touches_disk() {
    let project = TestProject::new();
    let mut session = session(&project, Settings::default(), ScriptedPrompter::new());
    let mut engine = groovy_engine(" externalFilenameBuildMode=\"NONE\"", "println 1");
    let mut ctx = session.context();

    assert_eq!(engine.load(&step(), &mut ctx), LoadStatus::NotLoaded);
    engine.set_content("println 2");
    assert_eq!(engine.save(&step(), &mut ctx, true, true), SaveStatus::Skipped);
    engine.commit(false).unwrap();

    assert!(!project.resource_root().exists());
    assert_eq!(engine.binding().content(), "println 2");
}

#[test]
fn missing_file_is_created_on_load() {
    let project = TestProject::new();
    let mut session = session(&project, Settings::default(), ScriptedPrompter::new());
    let mut engine = groovy_engine(" externalFilenameBuildMode=\"AUTO\"", "println 1");

    let status = engine.load(&step(), &mut session.context());

    assert_eq!(status, LoadStatus::SavedOnLoad);
    project.assert_resource_content("P/S/C/T.groovy", "println 1");
    assert_eq!(engine.external_path(), Some("P/S/C/T.groovy"));
    assert!(!engine.is_dirty());
}

#[test]
fn missing_file_without_content_is_not_loaded() {
    let project = TestProject::new();
    let mut session = session(&project, Settings::default(), ScriptedPrompter::new());
    let mut engine = groovy_engine(" externalFilenameBuildMode=\"AUTO\"", "");

    assert_eq!(engine.load(&step(), &mut session.context()), LoadStatus::NotLoaded);
    project.assert_resource_not_exists("P/S/C/T.groovy");
}

#[test]
fn save_then_load_round_trips() {
    let project = TestProject::new();
    let mut session = session(&project, Settings::default(), ScriptedPrompter::new());
    let content = "<soap:Envelope>\n  <caf\u{e9}/>\n</soap:Envelope>";

    let mut writer = request_engine(" externalFilenameBuildMode=\"AUTO\"", "");
    writer.set_content(content);
    assert_eq!(writer.save(&step(), &mut session.context(), false, false), SaveStatus::Saved);

    let mut reader = request_engine(" externalFilenameBuildMode=\"AUTO\"", "");
    assert_eq!(reader.load(&step(), &mut session.context()), LoadStatus::Loaded);
    assert_eq!(reader.content(), content);
}

#[test]
fn unchanged_second_save_skips_the_write() {
    let project = TestProject::new();
    let mut session = session(&project, Settings::default(), ScriptedPrompter::new());
    let mut engine = groovy_engine(" externalFilenameBuildMode=\"AUTO\"", "");
    engine.set_content("println 1");
    assert_eq!(engine.save(&step(), &mut session.context(), false, false), SaveStatus::Saved);

    let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
    project.set_resource_mtime("P/S/C/T.groovy", past);

    assert_eq!(engine.save(&step(), &mut session.context(), false, false), SaveStatus::Saved);
    assert_eq!(project.resource_mtime("P/S/C/T.groovy"), past);
}

#[test]
fn dual_modification_prompts_before_overwriting() {
    let project = TestProject::new();
    project.write_resource("P/S/C/T.groovy", "A");
    let prompter = ScriptedPrompter::new().answer_save(SaveConflictChoice::DiscardAndReload);
    let mut session = session(&project, Settings::default(), prompter);
    let mut engine = groovy_engine(" externalFilenameBuildMode=\"AUTO\"", "");
    assert_eq!(engine.load(&step(), &mut session.context()), LoadStatus::Loaded);

    engine.set_content("B");
    project.write_resource("P/S/C/T.groovy", "A2");
    project.advance_resource_mtime("P/S/C/T.groovy", 60);

    let status = engine.save(&step(), &mut session.context(), false, false);

    assert_eq!(status, SaveStatus::Reloaded);
    assert_eq!(engine.content(), "A2");
    project.assert_resource_content("P/S/C/T.groovy", "A2");
    assert!(matches!(
        session.prompter().asked(),
        [PromptRecord::SaveConflict { .. }]
    ));
}

#[test]
fn dual_modification_can_keep_memory() {
    let project = TestProject::new();
    project.write_resource("P/S/C/T.groovy", "A");
    let prompter = ScriptedPrompter::new().answer_save(SaveConflictChoice::OverwriteWithMemory);
    let mut session = session(&project, Settings::default(), prompter);
    let mut engine = groovy_engine(" externalFilenameBuildMode=\"AUTO\"", "");
    engine.load(&step(), &mut session.context());

    engine.set_content("B");
    project.advance_resource_mtime("P/S/C/T.groovy", 60);

    assert_eq!(engine.save(&step(), &mut session.context(), false, false), SaveStatus::Saved);
    project.assert_resource_content("P/S/C/T.groovy", "B");
    assert_eq!(session.prompter().asked().len(), 1);
}

#[test]
fn keep_in_project_conflict_remembers_answer() {
    let project = TestProject::new();
    project.write_resource("P/S/C/T.groovy", "from file");
    project.write_resource("P/S/C/U.groovy", "other file");
    let settings = Settings {
        keep_in_project: true,
        ..Settings::default()
    };
    let prompter = ScriptedPrompter::new().answer_load(LoadConflictChoice::ReloadExternalAlways);
    let mut session = session(&project, settings, prompter);

    let mut first = groovy_engine(" externalFilenameBuildMode=\"AUTO\"", "from project");
    assert_eq!(first.load(&step(), &mut session.context()), LoadStatus::Loaded);
    assert_eq!(first.content(), "from file");
    assert!(session.policy().prefers_external());

    let mut second = groovy_engine(" externalFilenameBuildMode=\"AUTO\"", "stale");
    let other = step().with_step("U");
    assert_eq!(second.load(&other, &mut session.context()), LoadStatus::Loaded);
    assert_eq!(second.content(), "other file");
    assert_eq!(session.prompter().asked().len(), 1);
}

#[test]
fn keep_in_project_prefer_project_overwrites_file() {
    let project = TestProject::new();
    project.write_resource("P/S/C/T.groovy", "from file");
    let settings = Settings {
        keep_in_project: true,
        ..Settings::default()
    };
    let prompter = ScriptedPrompter::new().answer_load(LoadConflictChoice::UseProject);
    let mut session = session(&project, settings, prompter);
    let mut engine = groovy_engine(" externalFilenameBuildMode=\"AUTO\"", "from project");

    assert_eq!(engine.load(&step(), &mut session.context()), LoadStatus::SavedOnLoad);
    assert_eq!(engine.content(), "from project");
    project.assert_resource_content("P/S/C/T.groovy", "from project");
    assert!(!session.policy().is_set());
}

#[test]
fn empty_file_loses_to_inline_content_silently() {
    let project = TestProject::new();
    project.write_resource("P/S/C/T.groovy", "");
    let settings = Settings {
        keep_in_project: true,
        ..Settings::default()
    };
    let mut session = session(&project, settings, ScriptedPrompter::new());
    let mut engine = groovy_engine(" externalFilenameBuildMode=\"AUTO\"", "inline");

    assert_eq!(engine.load(&step(), &mut session.context()), LoadStatus::Loaded);
    assert_eq!(engine.content(), "inline");
    assert!(engine.is_dirty());
    assert!(session.prompter().asked().is_empty());
}

#[test]
fn without_keep_in_project_file_wins() {
    let project = TestProject::new();
    project.write_resource("P/S/C/T.groovy", "from file");
    let mut session = session(&project, Settings::default(), ScriptedPrompter::new());
    let mut engine = groovy_engine(" externalFilenameBuildMode=\"AUTO\"", "from project");

    assert_eq!(engine.load(&step(), &mut session.context()), LoadStatus::Loaded);
    assert_eq!(engine.content(), "from file");
    assert!(session.prompter().asked().is_empty());
}

#[test]
fn rename_moves_instead_of_duplicating() {
    let project = TestProject::new();
    let mut session = session(&project, Settings::default(), ScriptedPrompter::new());
    let mut engine = request_engine(" externalFilenameBuildMode=\"AUTO\"", "<body/>");
    engine.load(&step(), &mut session.context());
    project.assert_resource_exists("P/S/C/T-request.xml");

    let renamed = step().with_step("T2");
    let outcome = engine.rename(&renamed, &mut session.context()).unwrap();

    assert!(outcome.moved);
    assert!(outcome.new_path.as_str().ends_with("P/S/C/T2-request.xml"));
    project.assert_resource_not_exists("P/S/C/T-request.xml");
    project.assert_resource_content("P/S/C/T2-request.xml", "<body/>");
    assert_eq!(engine.external_path(), Some("P/S/C/T2-request.xml"));
}

#[test]
fn rename_with_unchanged_path_is_a_no_op() {
    let project = TestProject::new();
    let mut session = session(&project, Settings::default(), ScriptedPrompter::new());
    let mut engine = request_engine(" externalFilenameBuildMode=\"AUTO\"", "<body/>");
    engine.load(&step(), &mut session.context());

    assert!(engine.rename(&step(), &mut session.context()).is_none());
}

#[test]
fn rename_onto_existing_file_can_save_elsewhere() {
    let project = TestProject::new();
    project.write_resource("P/S/C/T2-request.xml", "occupied");
    let prompter = ScriptedPrompter::new()
        .answer_overwrite(false)
        .answer_save_as(Some("custom/T2.xml"));
    let mut session = session(&project, Settings::default(), prompter);
    let mut engine = request_engine(" externalFilenameBuildMode=\"AUTO\"", "<body/>");
    engine.load(&step(), &mut session.context());

    let outcome = engine
        .rename(&step().with_step("T2"), &mut session.context())
        .unwrap();

    assert!(outcome.moved);
    project.assert_resource_content("P/S/C/T2-request.xml", "occupied");
    project.assert_resource_content("custom/T2.xml", "<body/>");
    assert_eq!(engine.naming_mode(), Some(NamingMode::Manual));
    assert_eq!(engine.external_path(), Some("custom/T2.xml"));
}

#[test]
fn declined_rename_keeps_tracking_the_old_file() {
    let project = TestProject::new();
    project.write_resource("P/S/C/T2-request.xml", "occupied");
    let prompter = ScriptedPrompter::new()
        .answer_overwrite(false)
        .answer_save_as(None);
    let mut session = session(&project, Settings::default(), prompter);
    let mut engine = request_engine(" externalFilenameBuildMode=\"AUTO\"", "<body/>");
    engine.load(&step(), &mut session.context());

    let renamed = step().with_step("T2");
    let outcome = engine.rename(&renamed, &mut session.context()).unwrap();

    assert!(!outcome.moved);
    assert_eq!(engine.external_path(), Some("P/S/C/T-request.xml"));
    assert_eq!(engine.naming_mode(), Some(NamingMode::Manual));

    engine.set_content("<body2/>");
    assert_eq!(
        engine.save(&renamed, &mut session.context(), false, false),
        SaveStatus::Saved
    );
    project.assert_resource_content("P/S/C/T-request.xml", "<body2/>");
    project.assert_resource_content("P/S/C/T2-request.xml", "occupied");
}

#[test]
fn manual_holders_do_not_follow_renames() {
    let project = TestProject::new();
    let mut session = session(&project, Settings::default(), ScriptedPrompter::new());
    let mut engine = groovy_engine(
        " externalFilenameBuildMode=\"MANUAL\" externalFilename=\"scripts/shared.groovy\"",
        "println 1",
    );
    engine.load(&step(), &mut session.context());

    assert!(engine.rename(&step().with_step("X"), &mut session.context()).is_none());
    assert!(!engine.delete(&step(), session.store()));
    project.assert_resource_exists("scripts/shared.groovy");
}

#[test]
fn delete_prunes_empty_directories_but_keeps_siblings() {
    let project = TestProject::new();
    project.write_resource("P/sibling.groovy", "keep");
    let mut session = session(&project, Settings::default(), ScriptedPrompter::new());
    let mut engine = request_engine(" externalFilenameBuildMode=\"AUTO\"", "<body/>");
    engine.load(&step(), &mut session.context());
    project.assert_resource_exists("P/S/C/T-request.xml");

    assert!(engine.delete(&step(), session.store()));

    project.assert_resource_not_exists("P/S/C/T-request.xml");
    project.assert_resource_not_exists("P/S/C");
    project.assert_resource_not_exists("P/S");
    project.assert_resource_exists("P/sibling.groovy");
}

#[test]
fn composed_selection_skips_unselected_names() {
    let project = TestProject::new();
    let mut session = session(&project, Settings::default(), ScriptedPrompter::new());
    let mut engine = request_engine(
        " externalFilenameBuildMode=\"COMPOSED\" composeWithProjectName=\"true\" composeWithTestSuiteName=\"false\" composeWithTestCaseName=\"true\" composeWithTestStepName=\"true\"",
        "<body/>",
    );

    assert_eq!(engine.load(&step(), &mut session.context()), LoadStatus::SavedOnLoad);
    project.assert_resource_exists("P/C/T-request.xml");
}

#[test]
fn declined_overwrite_without_alternative_is_not_saved() {
    let project = TestProject::new();
    project.write_resource("existing.groovy", "theirs");
    let prompter = ScriptedPrompter::new()
        .answer_overwrite(false)
        .answer_save_as(None);
    let mut session = session(&project, Settings::default(), prompter);
    let mut engine = groovy_engine("", "mine");
    engine.set_manual_path("existing.groovy");

    assert_eq!(engine.save(&step(), &mut session.context(), false, false), SaveStatus::NotSaved);
    project.assert_resource_content("existing.groovy", "theirs");
    assert!(engine.config_changed());
}

#[test]
fn disabled_feature_skips_saves_but_still_loads() {
    let project = TestProject::new();
    project.write_resource("P/S/C/T.groovy", "from file");
    let settings = Settings {
        content_in_external_file: false,
        ..Settings::default()
    };
    let mut session = session(&project, settings, ScriptedPrompter::new());
    let mut engine = groovy_engine(" externalFilenameBuildMode=\"AUTO\"", "");

    assert_eq!(engine.load(&step(), &mut session.context()), LoadStatus::Loaded);
    engine.set_content("changed");
    assert_eq!(engine.save(&step(), &mut session.context(), false, false), SaveStatus::Skipped);
    project.assert_resource_content("P/S/C/T.groovy", "from file");
}

#[cfg(not(windows))]
#[test]
fn line_breaks_are_normalized_on_write() {
    let project = TestProject::new();
    let settings = Settings {
        normalize_line_breaks: true,
        ..Settings::default()
    };
    let mut session = session(&project, settings, ScriptedPrompter::new());
    let mut engine = groovy_engine(" externalFilenameBuildMode=\"AUTO\"", "");
    engine.set_content("a\r\nb\rc");

    assert_eq!(engine.save(&step(), &mut session.context(), false, false), SaveStatus::Saved);
    project.assert_resource_content("P/S/C/T.groovy", "a\nb\nc");
}
