//! Latest-wins request sequencing for preview processing.
//!
//! **Why**: every control change fires a server round-trip, and continuous
//! slider drags produce many overlapping requests against one preview
//! surface. The preview must converge on the newest parameter set and never
//! regress to an earlier response that happens to resolve late.
//!
//! The mechanism is a monotonically increasing sequence token, assigned when
//! a request is issued and compared again when its result arrives. Requests
//! are never serialized and the transport is never aborted; a superseded
//! response is simply discarded at completion time. A request that is
//! already superseded before its transport call starts is skipped without
//! contacting the server.
//!
//! **Used by**: RepixApp (submit on change, poll per frame)

use crate::core::workers::Workers;
use crate::entities::params::ParamSet;
use crate::entities::source::SourceImage;
use crate::remote::RemoteError;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, trace, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Immutable snapshot of one processing round-trip.
pub struct ProcessingRequest {
    pub token: u64,
    pub params: ParamSet,
    /// JSON-encoded hex colors, present when `params.palette` needs them.
    pub palette_data: Option<String>,
    pub source: Arc<SourceImage>,
}

/// Decoded bitmap returned by the service for one request.
pub struct ProcessedImage {
    pub rgba: image::RgbaImage,
}

/// Seam to the transport layer. Lets tests drive the sequencer with fake
/// services and assert the discard behavior without any network or GUI.
pub trait ProcessService: Send + Sync + 'static {
    fn process(&self, request: &ProcessingRequest) -> Result<ProcessedImage, RemoteError>;
}

enum RawOutcome {
    Done(Result<ProcessedImage, RemoteError>),
    /// Superseded before the transport call started; never sent.
    SkippedStale,
}

struct RawResult {
    token: u64,
    outcome: RawOutcome,
}

/// One settled request, classified against the newest issued token.
pub enum SequencerUpdate {
    /// Result of the newest request: render it.
    Rendered { token: u64, image: ProcessedImage },
    /// Superseded result (or pre-dispatch skip): drop silently.
    Stale { token: u64 },
    /// Transport or decode failure: surface it; bookkeeping is untouched and
    /// later submissions render normally.
    Failed { token: u64, error: RemoteError },
}

/// Owns the "current processing request" slot.
///
/// `latest_issued` is bumped on the UI thread before dispatch and read by
/// workers only for the pre-dispatch skip; classification of completed
/// results happens back on the UI thread in [`poll`](Self::poll), so the
/// `last_rendered` bookkeeping needs no lock.
pub struct RequestSequencer {
    service: Arc<dyn ProcessService>,
    workers: Arc<Workers>,
    latest_issued: Arc<AtomicU64>,
    last_rendered: Option<u64>,
    in_flight: usize,
    tx: Sender<RawResult>,
    rx: Receiver<RawResult>,
}

impl RequestSequencer {
    pub fn new(service: Arc<dyn ProcessService>, workers: Arc<Workers>) -> Self {
        let (tx, rx) = unbounded();
        Self {
            service,
            workers,
            latest_issued: Arc::new(AtomicU64::new(0)),
            last_rendered: None,
            in_flight: 0,
            tx,
            rx,
        }
    }

    /// Issue a new request for the given parameters. Returns the assigned
    /// token, or None when no source image is loaded (silent no-op, nothing
    /// is sent).
    ///
    /// Tokens strictly increase for the session's lifetime and are assigned
    /// before dispatch, so a completed result can never carry a token above
    /// `latest_issued`.
    pub fn submit(
        &mut self,
        params: &ParamSet,
        palette_data: Option<String>,
        source: Option<&Arc<SourceImage>>,
    ) -> Option<u64> {
        let Some(source) = source else {
            trace!("submit: no source image loaded, nothing to do");
            return None;
        };

        let token = self.latest_issued.fetch_add(1, Ordering::Relaxed) + 1;
        let request = ProcessingRequest {
            token,
            params: params.clone(),
            palette_data,
            source: Arc::clone(source),
        };
        debug!(
            "submit: token={} palette='{}' block={} res={}",
            token,
            request.params.palette,
            request.params.block_size,
            request.params.resolution.wire()
        );

        self.in_flight += 1;
        let service = Arc::clone(&self.service);
        let latest = Arc::clone(&self.latest_issued);
        let tx = self.tx.clone();
        self.workers.execute(move || {
            // Superseded while queued: skip the transport call entirely.
            if latest.load(Ordering::Relaxed) != request.token {
                trace!("token={} superseded before dispatch, skipping", request.token);
                let _ = tx.send(RawResult {
                    token: request.token,
                    outcome: RawOutcome::SkippedStale,
                });
                return;
            }
            let outcome = service.process(&request);
            let _ = tx.send(RawResult {
                token: request.token,
                outcome: RawOutcome::Done(outcome),
            });
        });
        Some(token)
    }

    /// Drain settled requests and classify each against `latest_issued`.
    ///
    /// Arrival order is irrelevant; only the token comparison at this moment
    /// governs acceptance. Call once per UI frame on the thread that renders.
    pub fn poll(&mut self) -> Vec<SequencerUpdate> {
        let mut updates = Vec::new();
        while let Ok(raw) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            let latest = self.latest_issued.load(Ordering::Relaxed);

            let update = match raw.outcome {
                RawOutcome::SkippedStale => SequencerUpdate::Stale { token: raw.token },
                RawOutcome::Done(Ok(image)) if raw.token == latest => {
                    // Tokens are unique and only the newest renders, so the
                    // rendered token can only move forward.
                    debug_assert!(self.last_rendered.is_none_or(|prev| prev < raw.token));
                    self.last_rendered = Some(raw.token);
                    debug!("token={} rendered ({} in flight)", raw.token, self.in_flight);
                    SequencerUpdate::Rendered {
                        token: raw.token,
                        image,
                    }
                }
                RawOutcome::Done(Ok(_)) => {
                    debug!("token={} stale (latest={}), discarded", raw.token, latest);
                    SequencerUpdate::Stale { token: raw.token }
                }
                RawOutcome::Done(Err(error)) => {
                    warn!("token={} failed: {}", raw.token, error);
                    SequencerUpdate::Failed {
                        token: raw.token,
                        error,
                    }
                }
            };
            updates.push(update);
        }
        updates
    }

    /// Newest issued token (0 when nothing has been submitted yet).
    pub fn latest_issued(&self) -> u64 {
        self.latest_issued.load(Ordering::Relaxed)
    }

    /// Token of the result currently on the render surface, if any.
    pub fn last_rendered(&self) -> Option<u64> {
        self.last_rendered
    }

    /// Requests submitted but not yet settled through [`poll`](Self::poll).
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{Receiver as CbReceiver, Sender as CbSender};
    use image::{Rgba, RgbaImage};
    use std::collections::HashSet;
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    fn test_source() -> Arc<SourceImage> {
        let img = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        Arc::new(SourceImage::from_bytes(bytes).unwrap())
    }

    /// 1x1 bitmap with the token baked into the red channel, so tests can
    /// tell which result actually rendered.
    fn token_image(token: u64) -> ProcessedImage {
        ProcessedImage {
            rgba: RgbaImage::from_pixel(1, 1, Rgba([token as u8, 0, 0, 255])),
        }
    }

    /// Fake service: records calls, optionally fails tokens, and blocks on a
    /// per-call gate so tests control completion order deterministically.
    struct FakeService {
        calls: Mutex<Vec<u64>>,
        fail: HashSet<u64>,
        /// Tokens that must wait for a release; process() announces the start
        /// on `started_tx` and blocks on `gate_rx`.
        gated: HashSet<u64>,
        started_tx: CbSender<u64>,
        gate_rx: CbReceiver<()>,
    }

    struct FakeHandles {
        started_rx: CbReceiver<u64>,
        gate_tx: CbSender<()>,
    }

    fn fake_service(fail: &[u64], gated: &[u64]) -> (Arc<FakeService>, FakeHandles) {
        let (started_tx, started_rx) = unbounded();
        let (gate_tx, gate_rx) = unbounded();
        let service = Arc::new(FakeService {
            calls: Mutex::new(Vec::new()),
            fail: fail.iter().copied().collect(),
            gated: gated.iter().copied().collect(),
            started_tx,
            gate_rx,
        });
        (service, FakeHandles { started_rx, gate_tx })
    }

    impl ProcessService for FakeService {
        fn process(&self, request: &ProcessingRequest) -> Result<ProcessedImage, RemoteError> {
            self.calls.lock().unwrap().push(request.token);
            if self.gated.contains(&request.token) {
                self.started_tx.send(request.token).unwrap();
                self.gate_rx
                    .recv_timeout(Duration::from_secs(5))
                    .expect("gate never released");
            }
            if self.fail.contains(&request.token) {
                return Err(RemoteError::Transport("connection reset".into()));
            }
            Ok(token_image(request.token))
        }
    }

    /// Poll until `count` updates have settled (or 2s elapse).
    fn drain(seq: &mut RequestSequencer, count: usize) -> Vec<SequencerUpdate> {
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut updates = Vec::new();
        while updates.len() < count && Instant::now() < deadline {
            updates.extend(seq.poll());
            std::thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(updates.len(), count, "timed out waiting for results");
        updates
    }

    fn rendered_token(update: &SequencerUpdate) -> Option<u64> {
        match update {
            SequencerUpdate::Rendered { token, .. } => Some(*token),
            _ => None,
        }
    }

    #[test]
    fn test_submit_without_source_is_noop() {
        let (service, _handles) = fake_service(&[], &[]);
        let workers = Arc::new(Workers::new(1));
        let mut seq = RequestSequencer::new(service.clone(), workers);

        assert_eq!(seq.submit(&ParamSet::default(), None, None), None);
        assert_eq!(seq.latest_issued(), 0);
        assert_eq!(seq.in_flight(), 0);
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_tokens_strictly_increase() {
        let (service, _handles) = fake_service(&[], &[]);
        let workers = Arc::new(Workers::new(1));
        let mut seq = RequestSequencer::new(service, workers);
        let source = test_source();

        assert_eq!(seq.submit(&ParamSet::default(), None, Some(&source)), Some(1));
        assert_eq!(seq.submit(&ParamSet::default(), None, Some(&source)), Some(2));
        assert_eq!(seq.latest_issued(), 2);
    }

    #[test]
    fn test_slow_early_result_never_overwrites_newer() {
        // Token 1 is slow (gated), token 2 resolves first and renders;
        // token 1's later completion must not regress the surface.
        let (service, handles) = fake_service(&[], &[1]);
        let workers = Arc::new(Workers::new(2));
        let mut seq = RequestSequencer::new(service, workers);
        let source = test_source();

        seq.submit(&ParamSet::default(), None, Some(&source));
        // Wait until token 1 is actually inside process(), then supersede it.
        handles.started_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        seq.submit(&ParamSet::default(), None, Some(&source));

        // Token 2 settles first.
        let first = drain(&mut seq, 1);
        assert_eq!(rendered_token(&first[0]), Some(2));
        assert_eq!(seq.last_rendered(), Some(2));

        // Release token 1; it must settle as stale, not rendered.
        handles.gate_tx.send(()).unwrap();
        let second = drain(&mut seq, 1);
        assert!(matches!(second[0], SequencerUpdate::Stale { token: 1 }));
        assert_eq!(seq.last_rendered(), Some(2));
        assert_eq!(seq.in_flight(), 0);
    }

    #[test]
    fn test_failure_does_not_block_later_success() {
        // Token 1 fails in flight while token 2 is already issued; the
        // failure surfaces without touching the render bookkeeping.
        let (service, handles) = fake_service(&[1], &[1]);
        let workers = Arc::new(Workers::new(1));
        let mut seq = RequestSequencer::new(service, workers);
        let source = test_source();

        seq.submit(&ParamSet::default(), None, Some(&source));
        handles.started_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        seq.submit(&ParamSet::default(), None, Some(&source));
        handles.gate_tx.send(()).unwrap();

        let updates = drain(&mut seq, 2);
        assert!(matches!(
            updates[0],
            SequencerUpdate::Failed { token: 1, .. }
        ));
        assert_eq!(rendered_token(&updates[1]), Some(2));
        assert_eq!(seq.last_rendered(), Some(2));
    }

    #[test]
    fn test_superseded_queue_entry_skips_transport() {
        // Single worker busy with token 1; tokens 2 and 3 queue up. When the
        // worker reaches token 2 it is already superseded and must not hit
        // the service at all.
        let (service, handles) = fake_service(&[], &[1]);
        let workers = Arc::new(Workers::new(1));
        let mut seq = RequestSequencer::new(service.clone(), workers);
        let source = test_source();

        seq.submit(&ParamSet::default(), None, Some(&source));
        handles.started_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        seq.submit(&ParamSet::default(), None, Some(&source));
        seq.submit(&ParamSet::default(), None, Some(&source));
        handles.gate_tx.send(()).unwrap();

        let updates = drain(&mut seq, 3);
        let rendered: Vec<u64> = updates.iter().filter_map(rendered_token).collect();
        assert_eq!(rendered, vec![3]);
        assert_eq!(seq.last_rendered(), Some(3));

        // Token 2 never reached the service.
        let calls = service.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![1, 3]);
    }

    #[test]
    fn test_resubmitting_identical_params_issues_fresh_tokens() {
        let (service, _handles) = fake_service(&[], &[]);
        let workers = Arc::new(Workers::new(1));
        let mut seq = RequestSequencer::new(service, workers);
        let source = test_source();
        let params = ParamSet::default();

        let a = seq.submit(&params, None, Some(&source));
        let b = seq.submit(&params, None, Some(&source));
        assert_ne!(a, b);

        drain(&mut seq, 2);
        // Whatever the interleaving, the surface ends on the newest token.
        assert_eq!(seq.last_rendered(), Some(2));
        assert_eq!(seq.in_flight(), 0);
    }

    #[test]
    fn test_rendered_image_is_the_newest_result() {
        let (service, handles) = fake_service(&[], &[1]);
        let workers = Arc::new(Workers::new(2));
        let mut seq = RequestSequencer::new(service, workers);
        let source = test_source();

        seq.submit(&ParamSet::default(), None, Some(&source));
        handles.started_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        seq.submit(&ParamSet::default(), None, Some(&source));

        let first = drain(&mut seq, 1);
        let SequencerUpdate::Rendered { image, .. } = &first[0] else {
            panic!("expected a rendered update");
        };
        // Red channel carries the token: must be 2, not 1.
        assert_eq!(image.rgba.get_pixel(0, 0)[0], 2);

        handles.gate_tx.send(()).unwrap();
        drain(&mut seq, 1);
    }
}
