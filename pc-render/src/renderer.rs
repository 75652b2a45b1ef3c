use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

use crate::{scene::SceneDocument, RenderError};

/// External renderer turning a scene file into an image.
pub trait SceneRenderer {
    fn render(&self, scene: &Path, output: &Path) -> Result<(), RenderError>;
}

/// Mitsuba 0.6 command line renderer
#[derive(Debug, Clone)]
pub struct Mitsuba {
    executable: PathBuf,
}

impl Mitsuba {
    pub fn new<P: AsRef<Path>>(executable: P) -> Self {
        Mitsuba {
            executable: executable.as_ref().to_path_buf(),
        }
    }
}

impl SceneRenderer for Mitsuba {
    fn render(&self, scene: &Path, output: &Path) -> Result<(), RenderError> {
        tracing::debug!(
            "Running {} -o {} {}",
            self.executable.display(),
            output.display(),
            scene.display()
        );

        let result = Command::new(&self.executable)
            .arg("-o")
            .arg(output)
            .arg(scene)
            .output()
            .map_err(|e| {
                RenderError::ExternalRenderFailure(format!(
                    "failed to run `{}`: {e}",
                    self.executable.display()
                ))
            })?;

        if !result.status.success() {
            return Err(RenderError::ExternalRenderFailure(format!(
                "`{}` exited with {}: {}",
                self.executable.display(),
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        Ok(())
    }
}

/// Write the document to `<workdir>/<name>.xml`, render it, wait `settle` and
/// remove the scene file again.
///
/// Removal is attempted even when writing or rendering failed, the first error
/// is returned.
pub fn render_document(
    renderer: &dyn SceneRenderer,
    document: &SceneDocument,
    workdir: &Path,
    name: &str,
    output: &Path,
    settle: Duration,
) -> Result<(), RenderError> {
    let scene = workdir.join(format!("{name}.xml"));

    let result = fs::create_dir_all(workdir)
        .and_then(|_| fs::write(&scene, document.to_string()))
        .map_err(RenderError::from)
        .and_then(|_| renderer.render(&scene, output));

    // the renderer may still hold the file
    std::thread::sleep(settle);

    match fs::remove_file(&scene) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove {}: {e}", scene.display()),
    }

    match &result {
        Ok(()) => tracing::info!("Rendered {} spheres into {}", document.len(), output.display()),
        Err(e) => tracing::error!("Rendering {} failed: {e}", scene.display()),
    }

    result
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crate::{scene::SceneBuilder, Point3, RenderConfig};

    use super::*;

    /// keeps every scene it is asked to render
    #[derive(Default)]
    struct Recorder {
        scenes: RefCell<Vec<String>>,
    }

    impl SceneRenderer for Recorder {
        fn render(&self, scene: &Path, output: &Path) -> Result<(), RenderError> {
            self.scenes.borrow_mut().push(fs::read_to_string(scene)?);
            fs::write(output, b"image")?;
            Ok(())
        }
    }

    struct Failing;

    impl SceneRenderer for Failing {
        fn render(&self, scene: &Path, _output: &Path) -> Result<(), RenderError> {
            assert!(scene.exists());
            Err(RenderError::ExternalRenderFailure("exit status: 1".to_string()))
        }
    }

    fn document() -> SceneDocument {
        SceneBuilder::new(&RenderConfig::default(), 0.025)
            .build([(Point3::new([0., 0., 0.0125]), [0.6, 0.6, 0.6])])
    }

    #[test]
    fn write_invoke_delete() {
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().join("work");
        let output = dir.path().join("result.png");
        let recorder = Recorder::default();

        render_document(
            &recorder,
            &document(),
            &workdir,
            "cloud",
            &output,
            Duration::ZERO,
        )
        .unwrap();

        assert_eq!(recorder.scenes.borrow().as_slice(), &[document().to_string()]);
        assert!(output.exists());
        assert!(!workdir.join("cloud.xml").exists());
    }

    #[test]
    fn cleanup_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("result.png");

        let result = render_document(
            &Failing,
            &document(),
            dir.path(),
            "cloud",
            &output,
            Duration::from_millis(1),
        );

        assert!(matches!(result, Err(RenderError::ExternalRenderFailure(_))));
        assert!(!dir.path().join("cloud.xml").exists());
        assert!(!output.exists());
    }

    #[test]
    fn missing_executable() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = Mitsuba::new(dir.path().join("no-such-renderer"));

        let result = render_document(
            &renderer,
            &document(),
            dir.path(),
            "cloud",
            &dir.path().join("result.png"),
            Duration::ZERO,
        );

        assert!(matches!(result, Err(RenderError::ExternalRenderFailure(_))));
        assert!(!dir.path().join("cloud.xml").exists());
    }
}
