use tracing::debug;

use crate::{
    handlers::{inventory::RemovalStatus, items::{ItemResponse, UpsertItemRequest}},
    services::{
        search::{FacetValue, FilterField, SearchHit, SearchQuery},
        stock::RemoveMetadata,
    },
};

use super::gateway::{GatewayError, InventoryGateway};

/// Reserved scan strings that switch the session mode. Real barcodes never
/// contain `*`, so these cannot collide with item codes.
pub const MODE_ADD: &str = "*ADD*";
pub const MODE_REMOVE: &str = "*REMOVE*";
pub const MODE_SEARCH: &str = "*SEARCH*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Idle,
    Add,
    Remove,
    Search,
}

/// Removal held back until the operator confirms it.
#[derive(Debug, Clone)]
pub struct PendingRemoval {
    pub item: ItemResponse,
    pub on_hand: i32,
}

/// Outcome of feeding one input (or one operator action) to the session,
/// telling the UI what to show next.
#[derive(Debug)]
pub enum SessionEvent {
    ModeChanged(ScanMode),
    ChooseModeFirst,
    Added {
        item: ItemResponse,
        on_hand: i32,
    },
    ConfirmRemoval {
        item: ItemResponse,
        on_hand: i32,
    },
    ZeroStockRegistered {
        item: ItemResponse,
    },
    Removed {
        item: ItemResponse,
        on_hand: i32,
    },
    OutOfStock {
        scanned_code: String,
    },
    RemovalDiscarded,
    /// The scanned code is unknown; a create sub-flow is open for it.
    NewItemNeeded {
        scanned_code: String,
    },
    Results(Vec<SearchHit>),
}

/// Scanner-driven session. Inputs are either one of the reserved mode codes
/// or a payload for whatever mode is active.
pub struct ScanSession<G> {
    gateway: G,
    mode: ScanMode,
    pending_removal: Option<PendingRemoval>,
    pending_creation: Option<String>,
    query: SearchQuery,
}

impl<G: InventoryGateway> ScanSession<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            mode: ScanMode::Idle,
            pending_removal: None,
            pending_creation: None,
            query: SearchQuery::default(),
        }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn pending_removal(&self) -> Option<&PendingRemoval> {
        self.pending_removal.as_ref()
    }

    pub fn pending_creation(&self) -> Option<&str> {
        self.pending_creation.as_deref()
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Feed one scanned string into the session. Mode codes always win, even
    /// mid-workflow, and drop any half-finished confirmation or creation.
    pub async fn handle_scan(&mut self, input: &str) -> Result<SessionEvent, GatewayError> {
        match input {
            MODE_ADD => return Ok(self.switch_mode(ScanMode::Add)),
            MODE_REMOVE => return Ok(self.switch_mode(ScanMode::Remove)),
            MODE_SEARCH => {
                self.switch_mode(ScanMode::Search);
                // Entering search shows the unfiltered catalog right away.
                self.query = SearchQuery::default();
                return self.run_search().await;
            }
            _ => {}
        }
        match self.mode {
            ScanMode::Idle => Ok(SessionEvent::ChooseModeFirst),
            ScanMode::Add | ScanMode::Remove => self.handle_item_scan(input).await,
            ScanMode::Search => {
                self.query.free_text = Some(input.to_string());
                self.run_search().await
            }
        }
    }

    /// Operator response to a [`SessionEvent::ConfirmRemoval`] prompt.
    pub async fn resolve_confirmation(
        &mut self,
        approved: bool,
        metadata: RemoveMetadata,
    ) -> Result<SessionEvent, GatewayError> {
        let Some(pending) = self.pending_removal.take() else {
            return Err(GatewayError::Rejected(
                "no removal awaiting confirmation".to_string(),
            ));
        };
        if !approved {
            debug!(code = %pending.item.scanned_code, "removal discarded");
            return Ok(SessionEvent::RemovalDiscarded);
        }
        match self
            .gateway
            .confirm_remove(&pending.item.scanned_code, metadata)
            .await
        {
            Ok(response) => Ok(SessionEvent::Removed {
                item: pending.item,
                on_hand: response.on_hand,
            }),
            // The stock moved under us between prompt and confirmation.
            Err(GatewayError::OutOfStock) => Ok(SessionEvent::OutOfStock {
                scanned_code: pending.item.scanned_code,
            }),
            Err(err) => Err(err),
        }
    }

    /// Finish the create sub-flow opened by [`SessionEvent::NewItemNeeded`].
    /// The new item is then treated as if it had just been scanned in the
    /// active mode.
    pub async fn complete_item_creation(
        &mut self,
        mut draft: UpsertItemRequest,
    ) -> Result<SessionEvent, GatewayError> {
        let Some(code) = self.pending_creation.take() else {
            return Err(GatewayError::Rejected(
                "no item creation in progress".to_string(),
            ));
        };
        draft.scanned_code = Some(code);
        let item = self.gateway.create_item(draft).await?;
        self.dispatch_known(&item.scanned_code).await
    }

    pub fn cancel_item_creation(&mut self) {
        self.pending_creation = None;
    }

    /// Toggle one facet value on or off and re-run the search. The gateway
    /// always receives the snapshot as it stands after the toggle.
    pub async fn toggle_filter(
        &mut self,
        field: FilterField,
        value: &str,
    ) -> Result<SessionEvent, GatewayError> {
        let values = self.query.filters.entry(field).or_default();
        if !values.remove(value) {
            values.insert(value.to_string());
        }
        if values.is_empty() {
            self.query.filters.remove(&field);
        }
        self.run_search().await
    }

    /// Facet values of one filterable field, for populating the filter menu
    /// shown alongside results. Display data only; toggles stay free-form.
    pub async fn facet_values(&self, field: FilterField) -> Result<Vec<FacetValue>, GatewayError> {
        self.gateway.distinct_values(field).await
    }

    pub async fn set_free_text(
        &mut self,
        text: Option<String>,
    ) -> Result<SessionEvent, GatewayError> {
        self.query.free_text = text.filter(|t| !t.trim().is_empty());
        self.run_search().await
    }

    fn switch_mode(&mut self, mode: ScanMode) -> SessionEvent {
        debug!(?mode, "scan mode switched");
        self.mode = mode;
        self.pending_removal = None;
        self.pending_creation = None;
        SessionEvent::ModeChanged(mode)
    }

    async fn handle_item_scan(&mut self, code: &str) -> Result<SessionEvent, GatewayError> {
        if self.gateway.find_item(code).await?.is_none() {
            self.pending_creation = Some(code.to_string());
            return Ok(SessionEvent::NewItemNeeded {
                scanned_code: code.to_string(),
            });
        }
        self.dispatch_known(code).await
    }

    async fn dispatch_known(&mut self, code: &str) -> Result<SessionEvent, GatewayError> {
        match self.mode {
            ScanMode::Add => {
                let response = self.gateway.add_one(code).await?;
                Ok(SessionEvent::Added {
                    item: response.item,
                    on_hand: response.on_hand,
                })
            }
            ScanMode::Remove => {
                let response = self.gateway.initiate_remove(code).await?;
                match response.status {
                    RemovalStatus::ConfirmationRequired => {
                        self.pending_removal = Some(PendingRemoval {
                            item: response.item.clone(),
                            on_hand: response.on_hand,
                        });
                        Ok(SessionEvent::ConfirmRemoval {
                            item: response.item,
                            on_hand: response.on_hand,
                        })
                    }
                    RemovalStatus::RegisteredZeroStock => {
                        Ok(SessionEvent::ZeroStockRegistered {
                            item: response.item,
                        })
                    }
                    RemovalStatus::Removed => Ok(SessionEvent::Removed {
                        item: response.item,
                        on_hand: response.on_hand,
                    }),
                }
            }
            ScanMode::Idle | ScanMode::Search => Ok(SessionEvent::ChooseModeFirst),
        }
    }

    async fn run_search(&mut self) -> Result<SessionEvent, GatewayError> {
        let hits = self.gateway.search(&self.query).await?;
        Ok(SessionEvent::Results(hits))
    }
}
