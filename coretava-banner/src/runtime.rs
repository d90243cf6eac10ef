//! Event loop for one banner unit.
//!
//! `update` returns requests as data; the loop dispatches them to the HTTP
//! and visibility managers, whose results come back as messages. Everything
//! runs on the caller's task: no locks, one message at a time.

use coretava_core::{CoreCmd, CoreRequest, Observation, ObserverFn, Router};
use coretava_http_manager::{HttpManager, HttpRequest};
use coretava_visibility_manager::{LayoutChange, VisibilityManager, VisibilityRequest};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

#[derive(Clone, Debug)]
pub enum Request<Msg> {
    Core(CoreRequest),
    Http(HttpRequest<Msg>),
    Visibility(VisibilityRequest<Msg>),
}

pub type Cmd<Msg> = CoreCmd<Request<Msg>>;

/// Host-side handle: push messages (mount, click, teardown) and layout.
#[derive(Clone)]
pub struct Ports<Msg> {
    app_tx: UnboundedSender<Msg>,
    layout_tx: UnboundedSender<LayoutChange>,
}

impl<Msg: Send + 'static> Ports<Msg> {
    pub fn send(&self, msg: Msg) {
        if self.app_tx.send(msg).is_err() {
            tracing::debug!("unit already torn down, dropping message");
        }
    }

    pub fn layout(&self, change: LayoutChange) {
        if self.layout_tx.send(change).is_err() {
            tracing::debug!("unit already torn down, dropping layout change");
        }
    }
}

pub struct Runtime<Init, Update, ViewFn, Recon, Model, ViewOut, Msg> {
    init: Init,
    update: Update,
    view: ViewFn,
    reconciler: Recon,
    observer: ObserverFn<Msg, Request<Msg>>,
    http: HttpManager,
    app_tx: UnboundedSender<Msg>,
    app_rx: UnboundedReceiver<Msg>,
    layout_tx: UnboundedSender<LayoutChange>,
    layout_rx: UnboundedReceiver<LayoutChange>,
    req_tx: UnboundedSender<Request<Msg>>,
    req_rx: UnboundedReceiver<Request<Msg>>,
    _model: std::marker::PhantomData<(Model, ViewOut)>,
}

impl<Init, Update, ViewFn, Recon, Model, ViewOut, Msg>
    Runtime<Init, Update, ViewFn, Recon, Model, ViewOut, Msg>
where
    Init: FnOnce() -> (Model, Cmd<Msg>),
    Update: Fn(Model, Msg) -> (Model, Cmd<Msg>),
    ViewFn: Fn(&Model) -> ViewOut,
    Recon: FnMut(&ViewOut),
    Msg: Clone + Send + 'static,
{
    pub fn new(
        init: Init,
        update: Update,
        view: ViewFn,
        reconciler: Recon,
        observer: ObserverFn<Msg, Request<Msg>>,
        http: HttpManager,
    ) -> Self {
        let (app_tx, app_rx) = unbounded_channel();
        let (layout_tx, layout_rx) = unbounded_channel();
        let (req_tx, req_rx) = unbounded_channel();
        Self {
            init,
            update,
            view,
            reconciler,
            observer,
            http,
            app_tx,
            app_rx,
            layout_tx,
            layout_rx,
            req_tx,
            req_rx,
            _model: std::marker::PhantomData,
        }
    }

    pub fn ports(&self) -> Ports<Msg> {
        Ports {
            app_tx: self.app_tx.clone(),
            layout_tx: self.layout_tx.clone(),
        }
    }

    fn enqueue_cmd(tx: &UnboundedSender<Request<Msg>>, cmd: Cmd<Msg>) {
        for req in cmd.into_inner() {
            let _ = tx.send(req);
        }
    }

    /// Run until the unit is unmounted; returns the final model.
    ///
    /// Must be awaited inside a tokio runtime (HTTP requests are spawned).
    /// Pending requests are always dispatched before the next message is
    /// handled, so effects keep the order `update` produced them in.
    pub async fn run(self) -> Model {
        let Runtime {
            init,
            update,
            view,
            mut reconciler,
            observer,
            http,
            app_tx,
            mut app_rx,
            mut layout_rx,
            req_tx,
            mut req_rx,
            ..
        } = self;

        let (mut model, init_cmd) = init();
        Self::enqueue_cmd(&req_tx, init_cmd);

        let router = Router::new(app_tx);
        let visibility = VisibilityManager;
        let mut visibility_state = VisibilityManager::init::<Msg>();

        reconciler(&view(&model));

        loop {
            tokio::select! {
                biased;
                Some(req) = req_rx.recv() => {
                    observer(&Observation::effect(req.clone()));
                    match req {
                        Request::Core(CoreRequest::Unmount) => break,
                        Request::Http(req) => http.on_effects(&router, vec![req]),
                        Request::Visibility(req) => {
                            visibility_state = visibility.on_effects(&router, visibility_state, vec![req]);
                        }
                    }
                }
                Some(change) = layout_rx.recv() => {
                    visibility_state = visibility.on_layout(&router, visibility_state, change);
                }
                Some(msg) = app_rx.recv() => {
                    observer(&Observation::event(msg.clone()));
                    let (new_model, cmd) = update(model, msg);
                    model = new_model;
                    Self::enqueue_cmd(&req_tx, cmd);
                    reconciler(&view(&model));
                }
                else => break,
            }
        }

        tracing::debug!(
            live_observations = visibility_state.live_observations(),
            "unit stopped"
        );
        model
    }
}
