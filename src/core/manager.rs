//! # TagManager - event-driven tag lifecycle manager.
//!
//! The manager owns the registry of displayed domains and orchestrates
//! creation, merge and eviction:
//! - incoming `DomainEvent` → create a record (or merge into the live one)
//! - armed expiry timer → evict the record when it fires un-reset
//! - `dismiss` → manual removal, independent of timer state
//! - `apply_config` / `clear_all` → runtime reconfiguration and global clear
//!
//! ## Architecture
//! ```text
//! EventSource ──► TagManager::handle_event
//!                     │
//!            ┌────────┴─────────┐
//!            ▼                  ▼
//!      absent key          present key
//!   build TagRecord       disarm old timer
//!   (color, width,        merge counter + subdomain
//!    icon=Pending)        recompute width
//!   arm expiry            re-arm expiry
//!   publish Create        publish Update
//!   spawn icon task
//!        │
//!        ▼
//!   IconResolver::resolve ──► still present? ──► mutate icon,
//!                             (check-then-act)   publish IconReady
//!
//! expiry timer ──► evict path: generation match? ──► remove, publish Remove
//! ```
//!
//! ## Rules
//! - The registry is the single source of truth; every directive is
//!   published while the registry write lock is still held, so wire order
//!   always matches mutation order (the broadcast send is synchronous and
//!   non-blocking).
//! - Every timer and icon callback re-validates registry presence before
//!   acting (check-then-act); stale fires and double removals are no-ops.
//! - Exactly one directive is published per accepted event; rejected events
//!   publish nothing and mutate nothing.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

use tokio::sync::{RwLock, broadcast};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::record::{ExpiryHandle, IconState, TagRecord};
use crate::error::EventDrop;
use crate::events::{Bus, Directive, DirectiveKind, DomainEvent};
use crate::icons::{IconOutcome, IconResolver};
use crate::visual::{ColorClass, MeasureText, WidthPolicy};

/// Event-driven registry of displayed tags.
///
/// ### Responsibilities
/// - Owns the `Registry` (domain → record) and the per-record expiry timers
/// - Derives visual attributes (color, width) when records change
/// - Kicks off icon resolution and applies its result only to live records
/// - Publishes the directive stream consumed by render sinks
///
/// ### Construction
/// Build via [`TagManager::builder`]; construct once and hold the handle.
/// The handle is cheap to clone (internally `Arc`-backed); timers and icon
/// continuations keep the shared state alive while they run. All mutation
/// goes through the single registry lock, so events for one domain are
/// processed in arrival order as complete units of work.
#[derive(Clone)]
pub struct TagManager {
    inner: Arc<Inner>,
}

/// Shared state behind the manager handle.
struct Inner {
    registry: RwLock<HashMap<String, TagRecord>>,
    cfg: RwLock<Config>,
    bus: Bus,
    resolver: Arc<IconResolver>,
    measure: Arc<dyn MeasureText>,
    width_policy: WidthPolicy,
    runtime_token: CancellationToken,
    /// Arm stamp source for expiry timers (see `TagRecord::generation`).
    arm_seq: AtomicU64,
}

impl TagManager {
    /// Creates a builder for constructing a manager with a fluent API.
    pub fn builder(cfg: Config) -> crate::core::builder::TagManagerBuilder {
        crate::core::builder::TagManagerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        resolver: Arc<IconResolver>,
        measure: Arc<dyn MeasureText>,
        width_policy: WidthPolicy,
        runtime_token: CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: RwLock::new(HashMap::new()),
                cfg: RwLock::new(cfg),
                bus,
                resolver,
                measure,
                width_policy,
                runtime_token,
                arm_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Creates a new receiver observing subsequent directives.
    ///
    /// Equivalent to subscribing on the bus directly; render surfaces that
    /// do not want the [`SinkSet`](crate::SinkSet) machinery consume this.
    pub fn subscribe(&self) -> broadcast::Receiver<Directive> {
        self.inner.bus.subscribe()
    }

    /// Handles one observed domain event.
    ///
    /// - Absent key: builds a record (count 1, color assigned, width
    ///   estimated, icon pending), arms expiry if TTL is in effect,
    ///   publishes `Create` and spawns the icon continuation.
    /// - Present key: cancels the old timer, merges counter and subdomain,
    ///   recomputes width, re-arms expiry, publishes `Update`.
    ///
    /// Exactly one directive is published per accepted event.
    ///
    /// # Errors
    /// [`EventDrop::Disabled`] when the feature is off,
    /// [`EventDrop::MalformedEvent`] for an empty base domain. Both leave
    /// the registry untouched; callers may log the label.
    pub async fn handle_event(&self, event: DomainEvent) -> Result<(), EventDrop> {
        let cfg = self.inner.cfg.read().await.clone();
        if !cfg.enabled {
            return Err(EventDrop::Disabled);
        }
        if event.base_domain.is_empty() {
            return Err(EventDrop::MalformedEvent);
        }
        let ttl = cfg.effective_ttl();
        let DomainEvent {
            base_domain,
            full_domain,
            ..
        } = event;

        let mut registry = self.inner.registry.write().await;
        let directive = match registry.entry(base_domain) {
            Entry::Occupied(mut occupied) => {
                let rec = occupied.get_mut();
                rec.disarm();
                rec.merge(full_domain);
                let base = rec.base_domain();
                let width = self
                    .inner
                    .width_policy
                    .estimate(self.inner.measure.as_ref(), &base, rec.count());
                rec.set_width(width);
                if let Some(ttl) = ttl {
                    self.arm_expiry(rec, ttl);
                }
                Directive::new(DirectiveKind::Update)
                    .with_domain(base)
                    .with_count(rec.count())
                    .with_width(width)
            }
            Entry::Vacant(vacant) => {
                let base: Arc<str> = Arc::from(vacant.key().as_str());
                let color = ColorClass::assign(&base);
                let width = self
                    .inner
                    .width_policy
                    .estimate(self.inner.measure.as_ref(), &base, 1);
                let mut rec = TagRecord::new(Arc::clone(&base), full_domain, color, width);
                if let Some(ttl) = ttl {
                    self.arm_expiry(&mut rec, ttl);
                }
                vacant.insert(rec);
                self.spawn_icon_continuation(Arc::clone(&base));
                Directive::new(DirectiveKind::Create)
                    .with_domain(base)
                    .with_count(1)
                    .with_width(width)
                    .with_color(color)
            }
        };
        // Published under the lock: wire order matches mutation order.
        self.inner.bus.publish(directive);
        drop(registry);
        Ok(())
    }

    /// Manually removes a tag.
    ///
    /// Returns `true` and publishes one `Remove` if the tag was live;
    /// returns `false` with no directive otherwise. Racing a second
    /// `dismiss` (or an expiry fire) is safe: whoever takes the record out
    /// of the registry first publishes, the loser observes a no-op.
    pub async fn dismiss(&self, domain: &str) -> bool {
        let mut registry = self.inner.registry.write().await;
        match registry.remove(domain) {
            Some(mut rec) => {
                rec.disarm();
                self.inner
                    .bus
                    .publish(Directive::new(DirectiveKind::Remove).with_domain(rec.base_domain()));
                true
            }
            None => false,
        }
    }

    /// Applies a configuration change at runtime.
    ///
    /// - Feature switched off: everything is cleared (one `RemoveAll`).
    /// - TTL no longer in effect: all timers are cancelled; records live
    ///   until dismissed or cleared.
    /// - TTL (re-)enabled: timer-less records are armed with the new
    ///   duration. Records that already hold a timer keep their remaining
    ///   time until their next natural reset, so a recently-touched domain
    ///   is not surprisingly rescheduled.
    pub async fn apply_config(&self, new: Config) {
        let was_enabled = {
            let mut cfg = self.inner.cfg.write().await;
            let was = cfg.enabled;
            *cfg = new.clone();
            was
        };

        if was_enabled && !new.enabled {
            self.clear_all().await;
            return;
        }

        let mut registry = self.inner.registry.write().await;
        match new.effective_ttl() {
            None => {
                for rec in registry.values_mut() {
                    rec.disarm();
                }
            }
            Some(ttl) => {
                for rec in registry.values_mut() {
                    if !rec.is_armed() {
                        self.arm_expiry(rec, ttl);
                    }
                }
            }
        }
    }

    /// Cancels every timer, empties the registry and publishes one
    /// `RemoveAll`.
    ///
    /// Published unconditionally: the directive declares "nothing is
    /// displayed", which holds for an already-empty registry too.
    pub async fn clear_all(&self) {
        let mut registry = self.inner.registry.write().await;
        for (_, mut rec) in registry.drain() {
            rec.disarm();
        }
        self.inner
            .bus
            .publish(Directive::new(DirectiveKind::RemoveAll));
    }

    /// Tears the manager down: cancels the runtime token (which stops all
    /// armed timers and the sink listener) and silently drains the registry.
    ///
    /// No directives are published; the process is going away.
    pub async fn shutdown(&self) {
        self.inner.runtime_token.cancel();
        let mut registry = self.inner.registry.write().await;
        for (_, mut rec) in registry.drain() {
            rec.disarm();
        }
    }

    // ---------------------------
    // Read side
    // ---------------------------

    /// Returns the sorted list of live base domains.
    pub async fn list(&self) -> Vec<String> {
        let registry = self.inner.registry.read().await;
        let mut names: Vec<String> = registry.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Returns true if no tags are live.
    pub async fn is_empty(&self) -> bool {
        self.inner.registry.read().await.is_empty()
    }

    /// Returns the occurrence count of a live tag.
    pub async fn count_of(&self, domain: &str) -> Option<u32> {
        self.inner
            .registry
            .read()
            .await
            .get(domain)
            .map(|r| r.count())
    }

    /// Returns the sorted distinct subdomains observed for a live tag.
    pub async fn subdomains_of(&self, domain: &str) -> Option<Vec<String>> {
        self.inner.registry.read().await.get(domain).map(|r| {
            let mut subs: Vec<String> = r.seen_subdomains().iter().cloned().collect();
            subs.sort_unstable();
            subs
        })
    }

    /// Returns the current visual attributes `(color, width)` of a live tag.
    ///
    /// Lets a render surface that attached mid-stream rebuild a tag it only
    /// saw an `Update` for.
    pub async fn visual_of(&self, domain: &str) -> Option<(ColorClass, f32)> {
        self.inner
            .registry
            .read()
            .await
            .get(domain)
            .map(|r| (r.color(), r.width()))
    }

    /// Returns the icon state of a live tag.
    pub async fn icon_state_of(&self, domain: &str) -> Option<IconState> {
        self.inner
            .registry
            .read()
            .await
            .get(domain)
            .map(|r| r.icon().clone())
    }

    /// Returns sorted `(domain, count)` pairs for all live tags.
    pub async fn snapshot(&self) -> Vec<(String, u32)> {
        let registry = self.inner.registry.read().await;
        let mut pairs: Vec<(String, u32)> = registry
            .iter()
            .map(|(name, rec)| (name.clone(), rec.count()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    // ---------------------------
    // Expiry path
    // ---------------------------

    /// Arms an expiry timer for a record, cancelling any previous one.
    ///
    /// Each arm gets a fresh generation stamp; the spawned timer carries it
    /// and the evict path compares stamps, so a timer armed for an older
    /// incarnation of the key can never evict a newer record.
    fn arm_expiry(&self, rec: &mut TagRecord, ttl: Duration) {
        let generation = self.inner.arm_seq.fetch_add(1, AtomicOrdering::Relaxed) + 1;
        let cancel = self.inner.runtime_token.child_token();
        rec.arm(
            ExpiryHandle {
                cancel: cancel.clone(),
            },
            generation,
        );

        let inner = Arc::clone(&self.inner);
        let domain = rec.base_domain();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = time::sleep(ttl) => {
                    inner.evict_expired(&domain, generation).await;
                }
            }
        });
    }

    /// Test/diagnostic entry to the timer-driven eviction path.
    #[cfg(test)]
    pub(crate) async fn evict_expired(&self, domain: &str, generation: u64) {
        self.inner.evict_expired(domain, generation).await;
    }

    // ---------------------------
    // Icon path
    // ---------------------------

    /// Spawns the asynchronous icon continuation for a freshly-created tag.
    ///
    /// The resolver always eventually settles (bounded wait). On
    /// completion the continuation re-checks that the record is still live
    /// before mutating its icon state and publishing `IconReady`; a record
    /// torn down mid-flight is never touched. The resolve is raced against
    /// the runtime token, so [`shutdown`](TagManager::shutdown) drops an
    /// in-flight resolution instead of letting it run out its bounded wait.
    fn spawn_icon_continuation(&self, domain: Arc<str>) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = inner.runtime_token.cancelled() => {}
                outcome = inner.resolver.resolve(&domain) => {
                    inner.settle_icon(&domain, outcome).await;
                }
            }
        });
    }
}

impl Inner {
    /// Timer-driven eviction.
    ///
    /// Looks the record up and validates the generation it was armed with;
    /// an absent key or a mismatched stamp means the timer is stale (the
    /// record was removed or re-armed in the meantime) and the fire is a
    /// silent no-op. A genuine eviction removes the record first, then
    /// publishes exactly one `Remove`.
    async fn evict_expired(&self, domain: &str, generation: u64) {
        let mut registry = self.registry.write().await;
        let removed = match registry.get(domain) {
            Some(rec) if rec.generation() == generation => registry.remove(domain),
            _ => None,
        };
        if let Some(mut rec) = removed {
            rec.disarm();
            self.bus
                .publish(Directive::new(DirectiveKind::Remove).with_domain(rec.base_domain()));
        }
    }

    /// Applies a settled icon outcome to a still-live record.
    async fn settle_icon(&self, domain: &Arc<str>, outcome: IconOutcome) {
        let mut registry = self.registry.write().await;
        if let Some(rec) = registry.get_mut(domain.as_ref()) {
            rec.set_icon(outcome.clone());
            self.bus.publish(
                Directive::new(DirectiveKind::IconReady)
                    .with_domain(Arc::clone(domain))
                    .with_icon(outcome),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use crate::error::IconError;
    use crate::icons::{FetchFn, FetchRef};

    fn short_ttl_cfg(ttl_ms: u64) -> Config {
        Config {
            ttl: Duration::from_millis(ttl_ms),
            ..Config::default()
        }
    }

    fn manager(cfg: Config) -> TagManager {
        TagManager::builder(cfg).build()
    }

    async fn recv(rx: &mut broadcast::Receiver<Directive>) -> Directive {
        time::timeout(Duration::from_secs(60), rx.recv())
            .await
            .expect("no directive within deadline")
            .expect("bus closed")
    }

    /// Receives until a directive of the wanted kind arrives.
    async fn recv_kind(
        rx: &mut broadcast::Receiver<Directive>,
        kind: DirectiveKind,
    ) -> Directive {
        loop {
            let d = recv(rx).await;
            if d.kind == kind {
                return d;
            }
        }
    }

    fn drain(rx: &mut broadcast::Receiver<Directive>) -> Vec<Directive> {
        let mut out = Vec::new();
        while let Ok(d) = rx.try_recv() {
            out.push(d);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_a_create_then_update_merges() {
        let mgr = manager(short_ttl_cfg(5000));
        let mut rx = mgr.subscribe();

        mgr.handle_event(DomainEvent::new("a.com", "x.a.com"))
            .await
            .unwrap();
        mgr.handle_event(DomainEvent::new("a.com", "y.a.com"))
            .await
            .unwrap();

        let create = recv_kind(&mut rx, DirectiveKind::Create).await;
        assert_eq!(create.domain.as_deref(), Some("a.com"));
        assert_eq!(create.count, Some(1));
        assert!(create.color.is_some());
        assert!(create.width.is_some());

        let update = recv_kind(&mut rx, DirectiveKind::Update).await;
        assert_eq!(update.count, Some(2));

        let (color, width) = mgr.visual_of("a.com").await.unwrap();
        assert_eq!(Some(color), create.color);
        assert_eq!(Some(width), update.width);
        assert_eq!(mgr.count_of("a.com").await, Some(2));
        assert_eq!(
            mgr.subdomains_of("a.com").await.unwrap(),
            vec!["x.a.com".to_string(), "y.a.com".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_full_domain_still_increments_counter() {
        let mgr = manager(short_ttl_cfg(5000));

        for _ in 0..3 {
            mgr.handle_event(DomainEvent::new("a.com", "x.a.com"))
                .await
                .unwrap();
        }

        assert_eq!(mgr.count_of("a.com").await, Some(3));
        assert_eq!(mgr.subdomains_of("a.com").await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn registry_holds_one_record_per_domain() {
        let mgr = manager(short_ttl_cfg(5000));

        for i in 0..10 {
            let sub = format!("s{i}.a.com");
            mgr.handle_event(DomainEvent::new("a.com", sub))
                .await
                .unwrap();
            mgr.handle_event(DomainEvent::new("b.com", "b.com"))
                .await
                .unwrap();
        }

        assert_eq!(
            mgr.list().await,
            vec!["a.com".to_string(), "b.com".to_string()]
        );
        assert_eq!(
            mgr.snapshot().await,
            vec![("a.com".to_string(), 10), ("b.com".to_string(), 10)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_b_ttl_expiry_emits_remove_exactly_once() {
        let mgr = manager(short_ttl_cfg(1000));
        let mut rx = mgr.subscribe();

        mgr.handle_event(DomainEvent::new("b.com", "b.com"))
            .await
            .unwrap();

        let remove = recv_kind(&mut rx, DirectiveKind::Remove).await;
        assert_eq!(remove.domain.as_deref(), Some("b.com"));
        assert!(mgr.is_empty().await);

        // No second removal fires later.
        time::sleep(Duration::from_secs(5)).await;
        assert!(
            drain(&mut rx)
                .iter()
                .all(|d| d.kind != DirectiveKind::Remove)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_c_disabled_ttl_never_evicts() {
        let mgr = manager(Config {
            ttl_enabled: false,
            ..Config::default()
        });
        let mut rx = mgr.subscribe();

        mgr.handle_event(DomainEvent::new("c.com", "c.com"))
            .await
            .unwrap();
        time::sleep(Duration::from_secs(60)).await;

        assert_eq!(mgr.count_of("c.com").await, Some(1));
        assert!(
            drain(&mut rx)
                .iter()
                .all(|d| d.kind != DirectiveKind::Remove)
        );

        // Manual dismissal still works.
        assert!(mgr.dismiss("c.com").await);
        assert!(mgr.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_d_zero_ttl_behaves_like_disabled() {
        let mgr = manager(Config {
            ttl: Duration::ZERO,
            ttl_enabled: true,
            ..Config::default()
        });
        let mut rx = mgr.subscribe();

        mgr.handle_event(DomainEvent::new("c.com", "c.com"))
            .await
            .unwrap();
        time::sleep(Duration::from_secs(60)).await;

        assert!(!mgr.is_empty().await);
        assert!(
            drain(&mut rx)
                .iter()
                .all(|d| d.kind != DirectiveKind::Remove)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn events_within_ttl_window_keep_resetting_expiry() {
        let mgr = manager(short_ttl_cfg(1000));

        mgr.handle_event(DomainEvent::new("a.com", "x.a.com"))
            .await
            .unwrap();
        for _ in 0..3 {
            time::sleep(Duration::from_millis(600)).await;
            mgr.handle_event(DomainEvent::new("a.com", "x.a.com"))
                .await
                .unwrap();
        }

        // 600ms after the last reset: still inside the fresh window.
        time::sleep(Duration::from_millis(600)).await;
        assert!(!mgr.is_empty().await);

        // 1100ms after the last reset: evicted.
        time::sleep(Duration::from_millis(500)).await;
        assert!(mgr.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn double_dismiss_yields_one_remove() {
        let mgr = manager(short_ttl_cfg(5000));
        let mut rx = mgr.subscribe();

        mgr.handle_event(DomainEvent::new("a.com", "a.com"))
            .await
            .unwrap();
        assert!(mgr.dismiss("a.com").await);
        assert!(!mgr.dismiss("a.com").await);

        // Let the stream settle, then count.
        time::sleep(Duration::from_millis(10)).await;
        let removes = drain(&mut rx)
            .into_iter()
            .filter(|d| d.kind == DirectiveKind::Remove)
            .count();
        assert_eq!(removes, 1);
        assert!(mgr.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_generation_never_evicts() {
        let mgr = manager(short_ttl_cfg(5000));

        mgr.handle_event(DomainEvent::new("a.com", "a.com"))
            .await
            .unwrap();
        // A fire carrying a stamp from an older arm must be ignored.
        mgr.evict_expired("a.com", 9999).await;
        assert_eq!(mgr.count_of("a.com").await, Some(1));

        // As must a fire for a key that is already gone.
        mgr.dismiss("a.com").await;
        mgr.evict_expired("a.com", 1).await;
        assert!(mgr.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_event_is_rejected_without_state_change() {
        let mgr = manager(short_ttl_cfg(5000));
        let mut rx = mgr.subscribe();

        let err = mgr
            .handle_event(DomainEvent::new("", "x.a.com"))
            .await
            .unwrap_err();
        assert_eq!(err, EventDrop::MalformedEvent);
        assert!(mgr.is_empty().await);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_feature_drops_events() {
        let mgr = manager(Config {
            enabled: false,
            ..Config::default()
        });

        let err = mgr
            .handle_event(DomainEvent::new("a.com", "a.com"))
            .await
            .unwrap_err();
        assert_eq!(err, EventDrop::Disabled);
        assert!(mgr.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn disabling_feature_clears_everything() {
        let mgr = manager(short_ttl_cfg(5000));
        let mut rx = mgr.subscribe();

        mgr.handle_event(DomainEvent::new("a.com", "a.com"))
            .await
            .unwrap();
        mgr.handle_event(DomainEvent::new("b.com", "b.com"))
            .await
            .unwrap();

        mgr.apply_config(Config {
            enabled: false,
            ..Config::default()
        })
        .await;

        recv_kind(&mut rx, DirectiveKind::RemoveAll).await;
        assert!(mgr.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn disabling_ttl_cancels_timers_for_live_tags() {
        let mgr = manager(short_ttl_cfg(500));

        mgr.handle_event(DomainEvent::new("a.com", "a.com"))
            .await
            .unwrap();
        mgr.apply_config(Config {
            ttl_enabled: false,
            ..Config::default()
        })
        .await;

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(mgr.count_of("a.com").await, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn apply_config_preserves_remaining_time_for_armed_tags() {
        let mgr = manager(short_ttl_cfg(1000));
        let mut rx = mgr.subscribe();

        mgr.handle_event(DomainEvent::new("a.com", "a.com"))
            .await
            .unwrap();
        time::sleep(Duration::from_millis(500)).await;

        mgr.apply_config(Config {
            ttl: Duration::from_secs(60),
            ..Config::default()
        })
        .await;

        // A tag created after the change gets the new 60s window.
        mgr.handle_event(DomainEvent::new("b.com", "b.com"))
            .await
            .unwrap();

        // The already-armed tag keeps its original deadline (500ms left);
        // it is not rescheduled onto the new duration.
        time::sleep(Duration::from_millis(600)).await;
        let remove = recv_kind(&mut rx, DirectiveKind::Remove).await;
        assert_eq!(remove.domain.as_deref(), Some("a.com"));
        assert_eq!(mgr.list().await, vec!["b.com".to_string()]);

        // The new tag lives out its full window.
        time::sleep(Duration::from_secs(59)).await;
        assert_eq!(mgr.list().await, vec!["b.com".to_string()]);
        time::sleep(Duration::from_secs(2)).await;
        assert!(mgr.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn enabling_ttl_arms_timerless_tags() {
        let mgr = manager(Config {
            ttl_enabled: false,
            ..Config::default()
        });

        mgr.handle_event(DomainEvent::new("a.com", "a.com"))
            .await
            .unwrap();
        time::sleep(Duration::from_secs(10)).await;
        assert!(!mgr.is_empty().await);

        mgr.apply_config(Config {
            ttl: Duration::from_millis(500),
            ttl_enabled: true,
            ..Config::default()
        })
        .await;

        time::sleep(Duration::from_secs(1)).await;
        assert!(mgr.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_e_failed_icon_falls_back_and_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher: FetchRef = {
            let calls = Arc::clone(&calls);
            FetchFn::arc(move |_domain: String| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, AtomicOrdering::SeqCst);
                    Err(IconError::Fetch {
                        error: "404".to_string(),
                    })
                }
            })
        };
        let mgr = TagManager::builder(short_ttl_cfg(60_000))
            .with_fetcher(fetcher)
            .build();
        let mut rx = mgr.subscribe();

        mgr.handle_event(DomainEvent::new("d.com", "d.com"))
            .await
            .unwrap();
        let ready = recv_kind(&mut rx, DirectiveKind::IconReady).await;
        assert_eq!(ready.icon, Some(IconOutcome::Fallback));
        assert_eq!(mgr.icon_state_of("d.com").await, Some(IconState::Fallback));

        // A later tag for the same domain reuses the cached fallback.
        mgr.dismiss("d.com").await;
        mgr.handle_event(DomainEvent::new("d.com", "d.com"))
            .await
            .unwrap();
        let ready = recv_kind(&mut rx, DirectiveKind::IconReady).await;
        assert_eq!(ready.icon, Some(IconOutcome::Fallback));
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn icon_continuation_skips_torn_down_records() {
        // Fetch takes far longer than the bounded wait; the tag is gone
        // before resolution settles.
        let fetcher: FetchRef = FetchFn::arc(|domain: String| async move {
            time::sleep(Duration::from_secs(3600)).await;
            Ok(format!("icon://{domain}").into())
        });
        let mgr = TagManager::builder(Config {
            ttl: Duration::from_secs(3600),
            icon_timeout: Duration::from_millis(200),
            ..Config::default()
        })
        .with_fetcher(fetcher)
        .build();
        let mut rx = mgr.subscribe();

        mgr.handle_event(DomainEvent::new("a.com", "a.com"))
            .await
            .unwrap();
        recv_kind(&mut rx, DirectiveKind::Create).await;
        assert!(mgr.dismiss("a.com").await);
        recv_kind(&mut rx, DirectiveKind::Remove).await;

        // Let the bounded wait elapse; no IconReady may surface.
        time::sleep(Duration::from_secs(1)).await;
        assert!(
            drain(&mut rx)
                .iter()
                .all(|d| d.kind != DirectiveKind::IconReady)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn directive_stream_is_a_linearization_of_registry_mutations() {
        let mgr = manager(Config {
            ttl_enabled: false,
            ..Config::default()
        });
        let mut rx = mgr.subscribe();

        // Hammer one key with racing dismissals and re-creations.
        for _ in 0..64 {
            mgr.handle_event(DomainEvent::new("a.com", "a.com"))
                .await
                .unwrap();
            let dismisser = {
                let m = mgr.clone();
                tokio::spawn(async move { m.dismiss("a.com").await })
            };
            let creator = {
                let m = mgr.clone();
                tokio::spawn(async move { m.handle_event(DomainEvent::new("a.com", "a.com")).await })
            };
            dismisser.await.unwrap();
            creator.await.unwrap().unwrap();
            mgr.dismiss("a.com").await;
        }

        // Replay the stream: every directive must be legal for the presence
        // state implied by the directives before it. An inversion (Remove
        // published after the Create of a re-created tag) trips this.
        let mut present = false;
        for d in drain(&mut rx) {
            match d.kind {
                DirectiveKind::Create => {
                    assert!(!present, "create published for a live tag");
                    present = true;
                }
                DirectiveKind::Update | DirectiveKind::IconReady => {
                    assert!(present, "{:?} published for an absent tag", d.kind);
                }
                DirectiveKind::Remove => {
                    assert!(present, "remove published for an absent tag");
                    present = false;
                }
                DirectiveKind::RemoveAll => present = false,
            }
        }
        assert!(!present);
        assert!(mgr.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_inflight_icon_resolution() {
        let fetched = Arc::new(AtomicUsize::new(0));
        let fetcher: FetchRef = {
            let fetched = Arc::clone(&fetched);
            FetchFn::arc(move |domain: String| {
                let fetched = Arc::clone(&fetched);
                async move {
                    time::sleep(Duration::from_millis(100)).await;
                    fetched.fetch_add(1, AtomicOrdering::SeqCst);
                    Ok(format!("icon://{domain}").into())
                }
            })
        };
        let mgr = TagManager::builder(Config {
            icon_timeout: Duration::from_secs(60),
            ..Config::default()
        })
        .with_fetcher(fetcher)
        .build();

        mgr.handle_event(DomainEvent::new("a.com", "a.com"))
            .await
            .unwrap();
        mgr.shutdown().await;

        // The continuation exits on the cancelled token and drops the
        // resolve; the fetch never completes, even well past its own delay.
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fetched.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn color_is_stable_across_record_lifetimes() {
        let mgr = manager(short_ttl_cfg(60_000));
        let mut rx = mgr.subscribe();

        mgr.handle_event(DomainEvent::new("a.com", "a.com"))
            .await
            .unwrap();
        let first = recv_kind(&mut rx, DirectiveKind::Create).await;

        mgr.dismiss("a.com").await;
        mgr.handle_event(DomainEvent::new("a.com", "a.com"))
            .await
            .unwrap();
        let second = recv_kind(&mut rx, DirectiveKind::Create).await;

        assert_eq!(first.color, second.color);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_timers_and_drains() {
        let mgr = manager(short_ttl_cfg(500));
        let mut rx = mgr.subscribe();

        mgr.handle_event(DomainEvent::new("a.com", "a.com"))
            .await
            .unwrap();
        mgr.shutdown().await;
        assert!(mgr.is_empty().await);

        // No Remove surfaces after teardown.
        time::sleep(Duration::from_secs(5)).await;
        assert!(
            drain(&mut rx)
                .iter()
                .all(|d| d.kind != DirectiveKind::Remove)
        );
    }
}
