use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::assets::decode::{PreparedImage, decode_image};
use crate::assets::loader::{AssetLoader, FsLoader};
use crate::assets::tracker::{AssetTracker, Generation, SlotKey};
use crate::foundation::error::{CardError, CardResult};
use crate::render::compose::{FrameView, render};
use crate::render::cpu::CpuSurface;
use crate::render::surface::{FontAsset, FontBook, Surface};
use crate::resolve::parts::{AssetPaths, resolve_with};
use crate::scene::creature::{GenerationRequest, RawRequest};
use crate::scene::query::{from_query, to_query};
use crate::session::layout::CardLayout;

/// Environment variable overriding [`SessionOpts::assets_root`].
pub const MEDIA_ROOT_ENV: &str = "MONSTERCARD_MEDIA_ROOT";
/// Environment variable overriding [`SessionOpts::load_threads`].
pub const LOAD_THREADS_ENV: &str = "MONSTERCARD_LOAD_THREADS";

/// Options controlling where a session reads assets from and how it loads them.
#[derive(Clone, Debug)]
pub struct SessionOpts {
    /// Directory the `./media/...` asset paths are resolved against.
    pub assets_root: PathBuf,
    /// Asset path templates.
    pub paths: AssetPaths,
    /// Loader pool size. `None` uses rayon defaults.
    pub load_threads: Option<usize>,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("."),
            paths: AssetPaths::default(),
            load_threads: Some(SlotKey::COUNT),
        }
    }
}

impl SessionOpts {
    /// Defaults, with `MONSTERCARD_MEDIA_ROOT` / `MONSTERCARD_LOAD_THREADS` applied when set.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(root) = std::env::var_os(MEDIA_ROOT_ENV).filter(|v| !v.is_empty()) {
            opts.assets_root = PathBuf::from(root);
        }
        if let Some(n) = std::env::var(LOAD_THREADS_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            opts.load_threads = Some(n);
        }
        opts
    }

    /// Set the assets root.
    pub fn with_assets_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.assets_root = root.into();
        self
    }

    /// Set the asset path templates.
    pub fn with_paths(mut self, paths: AssetPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Set the loader pool size.
    pub fn with_load_threads(mut self, threads: Option<usize>) -> Self {
        self.load_threads = threads;
        self
    }
}

/// Where the session is in its lifecycle. There is no way back to `Idle`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing submitted yet.
    Idle,
    /// Showing the most recently accepted request.
    Active(GenerationRequest),
}

/// Owns the tracker, layout and preloaded assets for one card, and drives submit/render/export.
pub struct CardSession {
    opts: SessionOpts,
    layout: CardLayout,
    tracker: AssetTracker,
    fallback_bg: Option<PreparedImage>,
    fonts: FontBook,
    state: SessionState,
}

impl CardSession {
    /// Session reading assets from `opts.assets_root` on disk.
    pub fn new(opts: SessionOpts, layout: CardLayout) -> CardResult<Self> {
        let loader = Arc::new(FsLoader::new(opts.assets_root.clone()));
        Self::with_loader(opts, layout, loader)
    }

    /// Session reading assets through `loader`.
    ///
    /// The fallback background and both fonts are fetched synchronously here. Failures are logged
    /// and leave the matching asset absent.
    pub fn with_loader(
        opts: SessionOpts,
        layout: CardLayout,
        loader: Arc<dyn AssetLoader>,
    ) -> CardResult<Self> {
        layout.validate()?;

        let fallback_path = opts.paths.fallback_background();
        let fallback_bg = match loader.load(&fallback_path).and_then(|b| decode_image(&b)) {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::warn!(
                    path = %fallback_path,
                    error = %e,
                    "fallback background unavailable"
                );
                None
            }
        };
        let fonts = FontBook {
            display: preload_font(loader.as_ref(), &layout.fonts.display),
            body: preload_font(loader.as_ref(), &layout.fonts.body),
        };

        let tracker = AssetTracker::new(loader, opts.load_threads)?;
        Ok(Self {
            opts,
            layout,
            tracker,
            fallback_bg,
            fonts,
            state: SessionState::Idle,
        })
    }

    /// Validate `raw` and, if accepted, start loading its card.
    ///
    /// A rejected request changes nothing: the previous card stays on screen.
    #[tracing::instrument(skip_all, fields(kind = %raw.kind))]
    pub fn submit(&mut self, raw: &RawRequest) -> CardResult<Generation> {
        let req = GenerationRequest::from_raw(raw)?;
        Ok(self.submit_request(req))
    }

    /// Start loading the card for an already validated request, superseding any previous one.
    pub fn submit_request(&mut self, req: GenerationRequest) -> Generation {
        let resolved = resolve_with(&self.opts.paths, req.kind, &req.scores);
        let generation = self.tracker.reset_all(&SlotKey::ALL);

        self.tracker.begin_load(SlotKey::Background, resolved.background.clone());
        for part in resolved.iter() {
            self.tracker.begin_load(SlotKey::Part(part.part), part.path.clone());
        }

        tracing::info!(
            kind = %req.kind,
            total = req.scores.total(),
            generation = generation.0,
            "request accepted"
        );
        self.state = SessionState::Active(req);
        generation
    }

    /// Submit from a share-link query. `Ok(None)` when the query names no kind.
    #[tracing::instrument(skip(self))]
    pub fn submit_query(&mut self, query: &str) -> CardResult<Option<Generation>> {
        Ok(from_query(query)?.map(|req| self.submit_request(req)))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The active request, `None` while idle.
    pub fn request(&self) -> Option<&GenerationRequest> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Active(req) => Some(req),
        }
    }

    /// Layout this session renders with.
    pub fn layout(&self) -> &CardLayout {
        &self.layout
    }

    /// Options this session was built with.
    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    /// Fonts loaded at startup.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Whether the fallback background loaded at startup.
    pub fn has_fallback_background(&self) -> bool {
        self.fallback_bg.is_some()
    }

    /// Slot state and counters.
    pub fn tracker(&self) -> &AssetTracker {
        &self.tracker
    }

    /// No load of the current generation is outstanding.
    pub fn is_settled(&self) -> bool {
        self.tracker.is_settled()
    }

    /// Some slot of the current generation failed to load.
    pub fn has_any_error(&self) -> bool {
        self.tracker.has_any_error()
    }

    /// Borrowed view of everything the next frame reads.
    pub fn frame_view(&self) -> FrameView<'_> {
        FrameView {
            request: self.request(),
            slots: self.tracker.slots(),
            fallback_background: self.fallback_bg.as_ref(),
            fonts: &self.fonts,
        }
    }

    /// A CPU surface sized for this session's layout.
    pub fn cpu_surface(&self) -> CardResult<CpuSurface> {
        CpuSurface::new(self.layout.canvas)
    }

    /// Apply whatever loads have finished, then draw one frame.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S) -> CardResult<()> {
        self.tracker.pump();
        render(surface, &self.frame_view(), &self.layout)
    }

    /// Tick every `cadence` until settled or `timeout` elapses. Returns whether it settled.
    #[tracing::instrument(skip(self, surface))]
    pub fn run_until_settled<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        cadence: Duration,
        timeout: Duration,
    ) -> CardResult<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            self.tick(surface)?;
            if self.is_settled() {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(pending = self.pending_slots(), "loads still outstanding");
                return Ok(false);
            }
            std::thread::sleep(cadence.min(deadline - now));
        }
    }

    /// Share-link query for the active request, `None` while idle.
    pub fn share_query(&self) -> Option<String> {
        self.request().map(to_query)
    }

    /// The active request, provided every load has settled.
    pub fn ensure_exportable(&self) -> CardResult<GenerationRequest> {
        let Some(req) = self.request() else {
            return Err(CardError::not_ready("no creature generated yet"));
        };
        if !self.is_settled() {
            return Err(CardError::not_ready(format!(
                "{} asset(s) still loading",
                self.pending_slots()
            )));
        }
        Ok(*req)
    }

    /// Render a final frame and write it to `dir/monster-<kind>.png`.
    ///
    /// Refused with [`CardError::NotReady`] while idle or while any load is outstanding.
    #[tracing::instrument(skip(self, surface), fields(dir = %dir.display()))]
    pub fn export_png(&mut self, surface: &mut CpuSurface, dir: &Path) -> CardResult<PathBuf> {
        self.tracker.pump();
        let req = self.ensure_exportable()?;

        render(surface, &self.frame_view(), &self.layout)?;
        let frame = surface.snapshot()?;
        let path = dir.join(export_file_name(&req));
        frame.write_png(&path)?;

        tracing::info!(path = %path.display(), errors = self.has_any_error(), "exported card");
        Ok(path)
    }

    fn pending_slots(&self) -> usize {
        self.tracker
            .slots()
            .iter()
            .filter(|(_, slot)| slot.is_loading())
            .count()
    }
}

/// `monster-<kind>.png`.
pub fn export_file_name(req: &GenerationRequest) -> String {
    format!("monster-{}.png", req.kind)
}

fn preload_font(loader: &dyn AssetLoader, path: &str) -> Option<FontAsset> {
    match loader.load(path) {
        Ok(bytes) => Some(FontAsset {
            key: path.to_string(),
            bytes: Arc::new(bytes),
        }),
        Err(e) => {
            tracing::warn!(%path, error = %e, "font unavailable; its text will be skipped");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/controller.rs"]
mod tests;
