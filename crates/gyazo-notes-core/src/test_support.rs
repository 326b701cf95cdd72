//! In-memory fakes for the engine's ports, shared by unit tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Semaphore;

use crate::codec::is_note_path;
use crate::config::SettingsStore;
use crate::models::{parse_timestamp, ImageMetadata, ImageRecord, OcrText, Settings};
use crate::notify::Notifier;
use crate::remote::ImageSource;
use crate::store::NoteStore;
use crate::{Error, Result};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

pub fn image(id: &str, created_at: &str) -> ImageRecord {
    ImageRecord {
        id: id.to_string(),
        created_at: parse_timestamp(created_at).unwrap(),
        permalink_url: format!("https://gyazo.com/{id}"),
        thumb_url: format!("https://thumb.gyazo.com/{id}.png"),
        content_url: format!("https://i.gyazo.com/{id}.png"),
        image_type: "png".to_string(),
        metadata: None,
        ocr: None,
    }
}

pub fn image_with_metadata(
    id: &str,
    created_at: &str,
    app: Option<&str>,
    title: Option<&str>,
) -> ImageRecord {
    let mut record = image(id, created_at);
    record.metadata = Some(ImageMetadata {
        app: app.map(str::to_string),
        title: title.map(str::to_string),
        source_url: None,
        description: None,
    });
    record
}

pub fn full_image(id: &str) -> ImageRecord {
    let mut record = image(id, "2024-01-05T10:30:00Z");
    record.metadata = Some(ImageMetadata {
        app: Some("Google Chrome".to_string()),
        title: Some("Release notes: \"v2\"".to_string()),
        source_url: Some("https://example.com/notes".to_string()),
        description: Some("Line one\nLine two".to_string()),
    });
    with_ocr(record, "en", "Release notes v2")
}

pub fn with_ocr(mut record: ImageRecord, locale: &str, text: &str) -> ImageRecord {
    record.ocr = Some(OcrText {
        locale: Some(locale.to_string()),
        description: Some(text.to_string()),
    });
    record
}

/// `count` images, newest first, ids `img-000`, `img-001`, ...
pub fn numbered_images(count: usize) -> Vec<ImageRecord> {
    (0..count)
        .map(|index| {
            let minute = 59 - (index % 60);
            let hour = 23 - (index / 60) % 24;
            image(
                &format!("img-{index:03}"),
                &format!("2024-01-05T{hour:02}:{minute:02}:00Z"),
            )
        })
        .collect()
}

#[derive(Default)]
struct SourceState {
    images: Vec<ImageRecord>,
    details: HashMap<String, ImageRecord>,
    failing_details: HashSet<String>,
    failing_list_page: Option<u32>,
    endless: bool,
    reject_deletes: bool,
    list_calls: Vec<u32>,
    detail_calls: Vec<String>,
    delete_calls: Vec<String>,
}

/// Scriptable [`ImageSource`]. Ids that are neither listed nor registered
/// as details answer `NotFound`.
#[derive(Clone, Default)]
pub struct FakeSource {
    state: Arc<Mutex<SourceState>>,
    list_gate: Option<Arc<Semaphore>>,
}

impl FakeSource {
    pub fn with_images(images: Vec<ImageRecord>) -> Self {
        let source = Self::default();
        lock(&source.state).images = images;
        source
    }

    /// Every page is full, forever.
    pub fn endless() -> Self {
        let source = Self::default();
        lock(&source.state).endless = true;
        source
    }

    /// List calls wait for a permit on `gate`.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.list_gate = Some(gate);
        self
    }

    pub fn set_images(&self, images: Vec<ImageRecord>) {
        lock(&self.state).images = images;
    }

    /// Detail answer for an id that is not (or differently) listed.
    pub fn set_detail(&self, record: ImageRecord) {
        lock(&self.state)
            .details
            .insert(record.id.clone(), record);
    }

    pub fn fail_detail(&self, id: &str) {
        lock(&self.state).failing_details.insert(id.to_string());
    }

    pub fn fail_list_page(&self, page: u32) {
        lock(&self.state).failing_list_page = Some(page);
    }

    pub fn reject_deletes(&self) {
        lock(&self.state).reject_deletes = true;
    }

    pub fn list_calls(&self) -> Vec<u32> {
        lock(&self.state).list_calls.clone()
    }

    pub fn detail_calls(&self) -> Vec<String> {
        lock(&self.state).detail_calls.clone()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        lock(&self.state).delete_calls.clone()
    }
}

impl ImageSource for FakeSource {
    async fn list_images(
        &self,
        _access_token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ImageRecord>> {
        if let Some(gate) = &self.list_gate {
            gate.acquire()
                .await
                .map_err(|error| Error::Transport(error.to_string()))?
                .forget();
        }

        let mut state = lock(&self.state);
        state.list_calls.push(page);
        if state.failing_list_page == Some(page) {
            return Err(Error::Transport(format!("page {page} unavailable (500)")));
        }

        let per_page = per_page as usize;
        if state.endless {
            return Ok((0..per_page)
                .map(|index| image(&format!("endless-{page}-{index}"), "2024-01-05T10:30:00Z"))
                .collect());
        }

        let start = (page as usize - 1) * per_page;
        Ok(state
            .images
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect())
    }

    async fn get_image(&self, _access_token: &str, image_id: &str) -> Result<ImageRecord> {
        let mut state = lock(&self.state);
        state.detail_calls.push(image_id.to_string());
        if state.failing_details.contains(image_id) {
            return Err(Error::Transport(format!("image {image_id} lookup failed (503)")));
        }
        if let Some(record) = state.details.get(image_id) {
            return Ok(record.clone());
        }
        state
            .images
            .iter()
            .find(|record| record.id == image_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(image_id.to_string()))
    }

    async fn delete_image(&self, _access_token: &str, image_id: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.delete_calls.push(image_id.to_string());
        if state.reject_deletes {
            return Err(Error::Transport(format!(
                "delete of image {image_id} failed: HTTP 500"
            )));
        }
        state.images.retain(|record| record.id != image_id);
        Ok(())
    }
}

#[derive(Default)]
struct NoteState {
    files: BTreeMap<PathBuf, String>,
    failing_deletes: HashSet<PathBuf>,
}

/// [`NoteStore`] over a map of vault-relative paths.
#[derive(Clone, Default)]
pub struct MemoryNoteStore {
    state: Arc<Mutex<NoteState>>,
}

impl MemoryNoteStore {
    pub fn insert(&self, path: &str, content: &str) {
        lock(&self.state)
            .files
            .insert(PathBuf::from(path), content.to_string());
    }

    pub fn get(&self, path: &str) -> Option<String> {
        lock(&self.state).files.get(Path::new(path)).cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        lock(&self.state).files.keys().cloned().collect()
    }

    pub fn fail_delete(&self, path: &str) {
        lock(&self.state).failing_deletes.insert(PathBuf::from(path));
    }
}

impl NoteStore for MemoryNoteStore {
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(lock(&self.state).files.contains_key(path))
    }

    async fn read(&self, path: &Path) -> Result<String> {
        lock(&self.state).files.get(path).cloned().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                path.display().to_string(),
            ))
        })
    }

    async fn create(&self, path: &Path, content: &str) -> Result<()> {
        let mut state = lock(&self.state);
        if state.files.contains_key(path) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                path.display().to_string(),
            )));
        }
        state.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    async fn modify(&self, path: &Path, content: &str) -> Result<()> {
        let mut state = lock(&self.state);
        match state.files.get_mut(path) {
            Some(existing) => {
                *existing = content.to_string();
                Ok(())
            }
            None => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                path.display().to_string(),
            ))),
        }
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let mut state = lock(&self.state);
        if state.failing_deletes.contains(path) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                path.display().to_string(),
            )));
        }
        state.files.remove(path);
        Ok(())
    }

    async fn create_dir_all(&self, _dir: &Path) -> Result<()> {
        Ok(())
    }

    async fn list_notes(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(lock(&self.state)
            .files
            .keys()
            .filter(|path| path.starts_with(dir) && is_note_path(path))
            .cloned()
            .collect())
    }
}

/// [`SettingsStore`] holding one in-memory value.
#[derive(Clone, Default)]
pub struct MemorySettingsStore {
    settings: Arc<Mutex<Settings>>,
    saves: Arc<Mutex<usize>>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(Mutex::new(settings)),
            saves: Arc::default(),
        }
    }

    pub fn current(&self) -> Settings {
        lock(&self.settings).clone()
    }

    pub fn save_count(&self) -> usize {
        *lock(&self.saves)
    }
}

impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Settings> {
        Ok(self.current())
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        *lock(&self.settings) = settings.clone();
        *lock(&self.saves) += 1;
        Ok(())
    }
}

/// Notifier that remembers every message.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        lock(&self.messages).push(message.to_string());
    }
}

/// Settings with a token and everything else at defaults.
pub fn configured_settings() -> Settings {
    Settings {
        access_token: Some("test-token".to_string()),
        ..Settings::default()
    }
}
