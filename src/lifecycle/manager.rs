// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, OnceCell, RwLock};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::{AccountContext, InstanceStatus};
use crate::config::{LibraryPollConfig, NetworkConfig};
use crate::error::{SdkError, SdkResult};
use crate::relayer::{FheInstance, RelayerRuntime};

/// Result of one `initialize`/`reinitialize` call
#[derive(Debug, Clone)]
pub enum InitOutcome {
    Ready { generation: u64 },
    Failed { generation: u64, error: Arc<SdkError> },
    /// A newer attempt started before this one settled; nothing was committed
    Superseded { generation: u64, current: u64 },
}

impl InitOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, InitOutcome::Ready { .. })
    }
}

/// Point-in-time copy of the shared lifecycle state
#[derive(Clone)]
pub struct InstanceSnapshot {
    pub status: InstanceStatus,
    pub instance: Option<Arc<dyn FheInstance>>,
    pub error: Option<Arc<SdkError>>,
    pub context: Option<AccountContext>,
    pub generation: u64,
}

impl fmt::Debug for InstanceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceSnapshot")
            .field("status", &self.status)
            .field("has_instance", &self.instance.is_some())
            .field("error", &self.error)
            .field("context", &self.context)
            .field("generation", &self.generation)
            .finish()
    }
}

/// A committed instance together with the account it is bound to
#[derive(Clone)]
pub struct ReadyInstance {
    pub instance: Arc<dyn FheInstance>,
    pub context: AccountContext,
}

struct InstanceState {
    status: InstanceStatus,
    instance: Option<Arc<dyn FheInstance>>,
    error: Option<Arc<SdkError>>,
    context: Option<AccountContext>,
    generation: u64,
}

/// Single writer of the session instance and its status.
///
/// Gateways hold an `Arc<InstanceManager>` and only read through
/// [`InstanceManager::ready`] / [`InstanceManager::snapshot`].
pub struct InstanceManager {
    runtime: Arc<dyn RelayerRuntime>,
    network: NetworkConfig,
    poll: LibraryPollConfig,
    // Bumped only while holding the state write lock
    generation: AtomicU64,
    state: RwLock<InstanceState>,
    bootstrapped: OnceCell<()>,
    status_tx: watch::Sender<InstanceStatus>,
}

impl InstanceManager {
    pub fn new(
        runtime: Arc<dyn RelayerRuntime>,
        network: NetworkConfig,
        poll: LibraryPollConfig,
    ) -> Self {
        let (status_tx, _) = watch::channel(InstanceStatus::Idle);
        Self {
            runtime,
            network,
            poll,
            generation: AtomicU64::new(0),
            state: RwLock::new(InstanceState {
                status: InstanceStatus::Idle,
                instance: None,
                error: None,
                context: None,
                generation: 0,
            }),
            bootstrapped: OnceCell::new(),
            status_tx,
        }
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Entry point for wallet connect and account/chain changes.
    ///
    /// Calling again for the context that is already `Ready` is a no-op. A context
    /// that failed stays failed until [`InstanceManager::reinitialize`].
    pub async fn initialize(&self, context: AccountContext) -> InitOutcome {
        {
            let state = self.state.read().await;
            if state.context == Some(context) {
                match (state.status, &state.error) {
                    (InstanceStatus::Ready, _) => {
                        debug!("FHE instance already ready for {:?}", context.account);
                        return InitOutcome::Ready {
                            generation: state.generation,
                        };
                    }
                    (InstanceStatus::Error, Some(error)) => {
                        return InitOutcome::Failed {
                            generation: state.generation,
                            error: error.clone(),
                        };
                    }
                    _ => {}
                }
            }
        }

        self.run_generation(context).await
    }

    /// Start a fresh attempt for the last known context, whatever the current status.
    pub async fn reinitialize(&self) -> SdkResult<InitOutcome> {
        let context = {
            let state = self.state.read().await;
            state.context.ok_or(SdkError::NotReady {
                status: state.status,
            })?
        };
        info!("Reinitializing FHE instance for {:?}", context.account);
        Ok(self.run_generation(context).await)
    }

    /// Drop the instance and return to `Idle`; in-flight attempts become stale.
    pub async fn disconnect(&self) {
        let mut state = self.state.write().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        state.generation = generation;
        state.instance = None;
        state.error = None;
        state.context = None;
        self.set_status(&mut state, InstanceStatus::Idle);
        info!("FHE instance released (generation {})", generation);
    }

    pub async fn snapshot(&self) -> InstanceSnapshot {
        let state = self.state.read().await;
        InstanceSnapshot {
            status: state.status,
            instance: state.instance.clone(),
            error: state.error.clone(),
            context: state.context,
            generation: state.generation,
        }
    }

    pub async fn status(&self) -> InstanceStatus {
        self.state.read().await.status
    }

    pub fn subscribe(&self) -> watch::Receiver<InstanceStatus> {
        self.status_tx.subscribe()
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// The committed instance, or `NotReady` if there is none.
    pub async fn ready(&self) -> SdkResult<ReadyInstance> {
        let state = self.state.read().await;
        match (state.status, &state.instance, state.context) {
            (InstanceStatus::Ready, Some(instance), Some(context)) => Ok(ReadyInstance {
                instance: instance.clone(),
                context,
            }),
            (status, _, _) => Err(SdkError::NotReady { status }),
        }
    }

    async fn run_generation(&self, context: AccountContext) -> InitOutcome {
        let generation = {
            let mut state = self.state.write().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.generation = generation;
            state.context = Some(context);
            state.instance = None;
            state.error = None;
            self.set_status(&mut state, InstanceStatus::LoadingLibrary);
            generation
        };
        info!(
            "Initializing FHE instance for {:?} on chain {} (generation {})",
            context.account, context.chain_id, generation
        );

        let result = self.run_steps(generation, &context).await;

        let mut state = self.state.write().await;
        let current = self.generation.load(Ordering::SeqCst);
        if current != generation {
            debug!(
                "Discarding initialization result of generation {} (current {})",
                generation, current
            );
            return InitOutcome::Superseded {
                generation,
                current,
            };
        }

        match result {
            Ok(instance) => {
                state.instance = Some(instance);
                state.error = None;
                self.set_status(&mut state, InstanceStatus::Ready);
                info!("FHE instance ready (generation {})", generation);
                InitOutcome::Ready { generation }
            }
            Err(err) => {
                error!("FHE instance initialization failed: {}", err);
                let err = Arc::new(err);
                state.instance = None;
                state.error = Some(err.clone());
                self.set_status(&mut state, InstanceStatus::Error);
                InitOutcome::Failed {
                    generation,
                    error: err,
                }
            }
        }
    }

    async fn run_steps(
        &self,
        generation: u64,
        context: &AccountContext,
    ) -> SdkResult<Arc<dyn FheInstance>> {
        self.wait_for_library(generation).await?;

        self.advance(generation, InstanceStatus::InitializingLibrary)
            .await?;
        self.bootstrapped
            .get_or_try_init(|| async {
                debug!("Bootstrapping relayer runtime");
                self.runtime.bootstrap().await
            })
            .await
            .map_err(|e| SdkError::Initialization {
                stage: "bootstrapping runtime",
                source: Box::new(e),
            })?;

        self.advance(generation, InstanceStatus::CreatingInstance)
            .await?;
        self.runtime
            .create_instance(&self.network, context)
            .await
            .map_err(|e| SdkError::Initialization {
                stage: "creating instance",
                source: Box::new(e),
            })
    }

    /// Poll with a deadline: fixed interval, fixed number of attempts.
    async fn wait_for_library(&self, generation: u64) -> SdkResult<()> {
        let attempts = self.poll.max_attempts;
        for attempt in 1..=attempts {
            self.ensure_current(generation)?;
            if self.runtime.is_available().await {
                debug!("Relayer runtime available after {} attempt(s)", attempt);
                return Ok(());
            }
            if attempt < attempts {
                sleep(self.poll.interval()).await;
            }
        }
        warn!("Relayer runtime unavailable after {} attempts", attempts);
        Err(SdkError::NotAvailable { attempts })
    }

    async fn advance(&self, generation: u64, status: InstanceStatus) -> SdkResult<()> {
        let mut state = self.state.write().await;
        self.ensure_current(generation)?;
        self.set_status(&mut state, status);
        Ok(())
    }

    fn ensure_current(&self, generation: u64) -> SdkResult<()> {
        let current = self.generation.load(Ordering::SeqCst);
        if current == generation {
            Ok(())
        } else {
            Err(SdkError::StaleResult {
                generation,
                current,
            })
        }
    }

    fn set_status(&self, state: &mut InstanceState, status: InstanceStatus) {
        state.status = status;
        self.status_tx.send_replace(status);
    }
}
