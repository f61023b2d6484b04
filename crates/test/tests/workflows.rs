use std::fs;
use std::path::{Path, PathBuf};

use doty_application::{Library, Report, Workflow};
use doty_core::{CatalogError, CatalogStore};
use doty_test::{LogViewer, ScriptedSelector, announce, make_catalog};

fn touch(dir: &Path, name: &str) -> anyhow::Result<(PathBuf, String)> {
    let file = dir.join(name);
    fs::write(&file, b"%PDF-1.4")?;
    let canonical = fs::canonicalize(&file)?.to_string_lossy().into_owned();
    Ok((file, canonical))
}

#[test]
fn register_open_remove_round() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let library_dir = dir.path().join("library");
    fs::create_dir(&library_dir)?;
    let (file, path) = touch(&library_dir, "a.pdf")?;

    let catalog = make_catalog()?;
    let selector = ScriptedSelector::new([Some(0), Some(0)]);
    let viewer = LogViewer::new([format!("debug: zathura: loading\n{}", announce(5))])?;
    let library = Library::new(&catalog, &selector, &viewer);

    assert_eq!(
        library.run(Workflow::Add(file))?,
        Report::Added { path: path.clone() }
    );
    assert_eq!(catalog.page(&path)?, 1);

    assert_eq!(
        library.run(Workflow::Open)?,
        Report::PageUpdated {
            path: path.clone(),
            page: 5
        }
    );
    assert_eq!(viewer.opened(), vec![(path.clone(), 1)]);
    assert_eq!(catalog.page(&path)?, 5);

    assert_eq!(
        library.run(Workflow::Remove)?,
        Report::Removed { path: path.clone() }
    );
    assert!(catalog.list_paths()?.is_empty());
    assert!(matches!(
        catalog.page(&path),
        Err(CatalogError::NotFound { .. })
    ));
    Ok(())
}

#[test]
fn duplicate_registration_leaves_catalog_alone() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (file, path) = touch(dir.path(), "a.pdf")?;

    let catalog = make_catalog()?;
    let library = Library::new(&catalog, ScriptedSelector::default(), LogViewer::new([])?);

    library.run(Workflow::Add(file.clone()))?;
    catalog.set_page(&path, 30)?;
    let err = library.run(Workflow::Add(file)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CatalogError>(),
        Some(CatalogError::Duplicate { .. })
    ));
    assert_eq!(catalog.list_paths()?, vec![path.clone()]);
    assert_eq!(catalog.page(&path)?, 30);
    Ok(())
}

#[test]
fn chosen_ordinal_maps_to_offered_path() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let catalog = make_catalog()?;
    let selector = ScriptedSelector::new([Some(2)]);
    let viewer = LogViewer::new([announce(7)])?;
    let library = Library::new(&catalog, &selector, &viewer);

    for name in ["c.pdf", "a.pdf", "b.pdf"] {
        let (file, _) = touch(dir.path(), name)?;
        library.register(&file)?;
    }

    library.run(Workflow::Open)?;
    let offered = selector.offered();
    let opened = viewer.opened();
    assert_eq!(opened[0].0, offered[0][2]);
    assert_eq!(catalog.page(&offered[0][2])?, 7);
    assert_eq!(catalog.page(&offered[0][0])?, 1);
    Ok(())
}

#[test]
fn cancellation_never_mutates() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (file, path) = touch(dir.path(), "a.pdf")?;
    let catalog = make_catalog()?;
    let viewer = LogViewer::new([announce(9)])?;
    let library = Library::new(&catalog, ScriptedSelector::new([None, None]), &viewer);

    library.register(&file)?;
    assert_eq!(library.run(Workflow::Open)?, Report::Cancelled);
    assert_eq!(library.run(Workflow::Remove)?, Report::Cancelled);
    assert!(viewer.opened().is_empty());
    assert_eq!(catalog.list_paths()?, vec![path.clone()]);
    assert_eq!(catalog.page(&path)?, 1);
    Ok(())
}

#[test]
fn session_without_announcement_keeps_page() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (file, path) = touch(dir.path(), "a.pdf")?;
    let catalog = make_catalog()?;
    let viewer = LogViewer::new([
        format!("{}{}", announce(4), announce(12)),
        "debug: zathura: document closed\n".to_string(),
    ])?;
    let library = Library::new(&catalog, ScriptedSelector::new([Some(0), Some(0)]), &viewer);

    library.register(&file)?;
    library.run(Workflow::Open)?;
    assert_eq!(catalog.page(&path)?, 12);

    assert_eq!(
        library.run(Workflow::Open)?,
        Report::PageUnchanged { path: path.clone() }
    );
    assert_eq!(catalog.page(&path)?, 12);
    assert_eq!(viewer.opened()[1], (path, 12));
    Ok(())
}

#[cfg(unix)]
mod processes {
    use super::*;

    use doty_core::{SelectorSettings, ViewerSettings};
    use doty_engine::ProcessViewer;
    use doty_storage::Catalog;
    use doty_ui::FuzzyPicker;

    // Scripts run as `sh <script>` so they never need to be executable.
    fn script(dir: &Path, name: &str, body: &str) -> anyhow::Result<String> {
        let path = dir.join(name);
        fs::write(&path, format!("{body}\n"))?;
        Ok(path.to_string_lossy().into_owned())
    }

    #[test]
    fn real_processes_track_the_page() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let scratch = dir.path().join("scratch");
        fs::create_dir(&scratch)?;
        let (first, _) = touch(dir.path(), "a.pdf")?;
        let (second, second_path) = touch(dir.path(), "b.pdf")?;

        // Picks the second entry; the viewer sees `-l debug <path> --page <n>` as $1..$5 and
        // stops three pages past the start.
        let picker = script(dir.path(), "picker", "sed -n 2p")?;
        let viewer = script(
            dir.path(),
            "viewer",
            r#"echo "debug: zathura: Emitting signal for page 2" >&2
echo "debug: zathura: Emitting signal for page $(($5 + 3))" >&2"#,
        )?;

        let db_path = dir.path().join("db.sql");
        let catalog = Catalog::open(&db_path)?;
        let selector = FuzzyPicker::new(SelectorSettings {
            program: "sh".to_string(),
            args: vec![picker],
            ..SelectorSettings::default()
        })
        .with_scratch_dir(&scratch);
        let viewer = ProcessViewer::new(ViewerSettings {
            program: "sh".to_string(),
            debug_args: vec![viewer, "-l".to_string(), "debug".to_string()],
            ..ViewerSettings::default()
        })?;
        let library = Library::new(catalog, selector, viewer);

        library.register(&first)?;
        library.register(&second)?;
        assert_eq!(
            library.run(Workflow::Open)?,
            Report::PageUpdated {
                path: second_path.clone(),
                page: 4
            }
        );
        assert_eq!(
            library.run(Workflow::Open)?,
            Report::PageUpdated {
                path: second_path.clone(),
                page: 7
            }
        );
        assert!(fs::read_dir(&scratch)?.next().is_none());
        drop(library);

        let reopened = Catalog::open(&db_path)?;
        assert_eq!(reopened.page(&second_path)?, 7);
        Ok(())
    }
}
