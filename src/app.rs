use crate::catalog::{Catalog, Outcome, RefreshScope};
use crate::config::Config;
use crate::gate::AccessGate;
use crate::models::{Listing, Shop};
use crate::store::CatalogStore;
use crate::tui::{AppAction, InputMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Shops,
    Listings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopField {
    Name,
    WebsiteUrl,
}

impl ShopField {
    pub const ALL: [ShopField; 2] = [ShopField::Name, ShopField::WebsiteUrl];

    pub fn label(&self) -> &'static str {
        match self {
            ShopField::Name => "Name",
            ShopField::WebsiteUrl => "Website URL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingField {
    Shop,
    Title,
    Variant,
    ImageUrl,
    Url,
    Price,
    SalePrice,
    Category,
    Status,
}

impl ListingField {
    pub const ALL: [ListingField; 9] = [
        ListingField::Shop,
        ListingField::Title,
        ListingField::Variant,
        ListingField::ImageUrl,
        ListingField::Url,
        ListingField::Price,
        ListingField::SalePrice,
        ListingField::Category,
        ListingField::Status,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ListingField::Shop => "Shop",
            ListingField::Title => "Title",
            ListingField::Variant => "Variant",
            ListingField::ImageUrl => "Image URL",
            ListingField::Url => "Product URL",
            ListingField::Price => "Price CAD",
            ListingField::SalePrice => "Sale price CAD",
            ListingField::Category => "Category",
            ListingField::Status => "Status",
        }
    }

    pub fn is_selector(&self) -> bool {
        matches!(
            self,
            ListingField::Shop | ListingField::Category | ListingField::Status
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Shop { id: String, name: String },
    Listing { id: String, title: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    ShopForm,
    ListingForm,
    ConfirmDelete(DeleteTarget),
    Help,
}

/// Store round-trip queued by an action. It runs after the next frame is
/// drawn so the status line can show that work is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Refresh(RefreshScope),
    CreateShop,
    CreateListing,
    Delete(DeleteTarget),
}

pub struct App<S> {
    pub gate: AccessGate,
    pub catalog: Catalog<S>,

    // UI State
    pub focus: Pane,
    pub shop_index: usize,
    pub listing_index: usize,
    pub popup: Option<Popup>,
    pub shop_field: usize,
    pub listing_field: usize,

    pending: Option<Command>,
}

impl<S: CatalogStore> App<S> {
    pub fn new(config: &Config, store: S) -> Self {
        Self {
            gate: AccessGate::new(config.admin_password.clone()),
            catalog: Catalog::new(store),
            focus: Pane::Listings,
            shop_index: 0,
            listing_index: 0,
            popup: None,
            shop_field: 0,
            listing_field: 0,
            pending: None,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        if !self.gate.authorized {
            return InputMode::Login;
        }
        match &self.popup {
            None => InputMode::Browse,
            Some(Popup::ShopForm) => InputMode::ShopForm,
            Some(Popup::ListingForm) => InputMode::ListingForm,
            Some(Popup::ConfirmDelete(_)) => InputMode::Confirm,
            Some(Popup::Help) => InputMode::Help,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn selected_shop(&self) -> Option<&Shop> {
        self.catalog.shops.get(self.shop_index)
    }

    pub fn selected_listing(&self) -> Option<&Listing> {
        self.catalog.listings.get(self.listing_index)
    }

    pub fn current_shop_field(&self) -> ShopField {
        ShopField::ALL[self.shop_field % ShopField::ALL.len()]
    }

    pub fn current_listing_field(&self) -> ListingField {
        ListingField::ALL[self.listing_field % ListingField::ALL.len()]
    }

    /// Applies a key action. Returns `true` when the app should quit.
    pub fn handle_action(&mut self, action: AppAction) -> bool {
        match self.input_mode() {
            InputMode::Login => return self.handle_login(action),
            InputMode::ShopForm | InputMode::ListingForm => return self.handle_form(action),
            _ => {}
        }

        match action {
            AppAction::Quit => return true,

            AppAction::FocusNext => {
                self.focus = match self.focus {
                    Pane::Shops => Pane::Listings,
                    Pane::Listings => Pane::Shops,
                };
            }

            AppAction::MoveUp => match self.focus {
                Pane::Shops => self.shop_index = self.shop_index.saturating_sub(1),
                Pane::Listings => self.listing_index = self.listing_index.saturating_sub(1),
            },

            AppAction::MoveDown => match self.focus {
                Pane::Shops => {
                    if self.shop_index + 1 < self.catalog.shops.len() {
                        self.shop_index += 1;
                    }
                }
                Pane::Listings => {
                    if self.listing_index + 1 < self.catalog.listings.len() {
                        self.listing_index += 1;
                    }
                }
            },

            AppAction::Refresh => {
                self.catalog.message = None;
                self.pending = Some(Command::Refresh(RefreshScope::Both));
            }

            AppAction::NewShop => {
                self.shop_field = 0;
                self.popup = Some(Popup::ShopForm);
            }

            AppAction::NewListing => {
                self.listing_field = 0;
                self.popup = Some(Popup::ListingForm);
            }

            AppAction::DeleteSelected => {
                let target = match self.focus {
                    Pane::Shops => self.selected_shop().map(|s| DeleteTarget::Shop {
                        id: s.id.clone(),
                        name: s.name.clone(),
                    }),
                    Pane::Listings => self.selected_listing().map(|l| DeleteTarget::Listing {
                        id: l.id.clone(),
                        title: l.title_raw.clone(),
                    }),
                };
                if let Some(target) = target {
                    self.popup = Some(Popup::ConfirmDelete(target));
                }
            }

            AppAction::OpenInBrowser => {
                let url = match self.focus {
                    Pane::Shops => self.selected_shop().and_then(|s| s.website_url.clone()),
                    Pane::Listings => self.selected_listing().and_then(|l| l.url.clone()),
                };
                if let Some(url) = url {
                    if let Err(e) = open::that(&url) {
                        tracing::warn!("Failed to open {}: {}", url, e);
                    }
                }
            }

            AppAction::ConfirmYes => {
                if let Some(Popup::ConfirmDelete(target)) = self.popup.take() {
                    self.pending = Some(Command::Delete(target));
                }
            }

            AppAction::ConfirmNo => {
                self.popup = None;
            }

            AppAction::ShowHelp => {
                self.popup = Some(Popup::Help);
            }

            AppAction::HideHelp => {
                self.popup = None;
            }

            _ => {}
        }

        false
    }

    fn handle_login(&mut self, action: AppAction) -> bool {
        match action {
            AppAction::Quit => return true,
            AppAction::InputChar(c) => self.gate.candidate.push(c),
            AppAction::InputBackspace => {
                self.gate.candidate.pop();
            }
            AppAction::InputSubmit => {
                if self.gate.submit() {
                    self.pending = Some(Command::Refresh(RefreshScope::Both));
                }
            }
            _ => {}
        }
        false
    }

    fn handle_form(&mut self, action: AppAction) -> bool {
        let listing_form = self.popup == Some(Popup::ListingForm);
        let field_count = if listing_form {
            ListingField::ALL.len()
        } else {
            ShopField::ALL.len()
        };
        let cursor = if listing_form {
            &mut self.listing_field
        } else {
            &mut self.shop_field
        };

        match action {
            AppAction::Quit => return true,
            AppAction::NextField => *cursor = (*cursor + 1) % field_count,
            AppAction::PrevField => *cursor = (*cursor + field_count - 1) % field_count,
            // the form keeps its values so it can be reopened and finished later
            AppAction::InputCancel => self.popup = None,
            AppAction::InputSubmit => {
                self.pending = Some(if listing_form {
                    Command::CreateListing
                } else {
                    Command::CreateShop
                });
            }
            AppAction::InputChar(c) => {
                if let Some(buffer) = self.field_buffer() {
                    buffer.push(c);
                }
            }
            AppAction::InputBackspace => {
                if let Some(buffer) = self.field_buffer() {
                    buffer.pop();
                }
            }
            AppAction::CycleLeft => self.cycle_selector(false),
            AppAction::CycleRight => self.cycle_selector(true),
            _ => {}
        }
        false
    }

    fn field_buffer(&mut self) -> Option<&mut String> {
        match self.popup {
            Some(Popup::ShopForm) => {
                let field = self.current_shop_field();
                let form = &mut self.catalog.shop_form;
                Some(match field {
                    ShopField::Name => &mut form.name,
                    ShopField::WebsiteUrl => &mut form.website_url,
                })
            }
            Some(Popup::ListingForm) => {
                let field = self.current_listing_field();
                let form = &mut self.catalog.listing_form;
                match field {
                    ListingField::Title => Some(&mut form.title_raw),
                    ListingField::Variant => Some(&mut form.variant),
                    ListingField::ImageUrl => Some(&mut form.image_url),
                    ListingField::Url => Some(&mut form.url),
                    ListingField::Price => Some(&mut form.price_cad),
                    ListingField::SalePrice => Some(&mut form.sale_price_cad),
                    ListingField::Shop | ListingField::Category | ListingField::Status => None,
                }
            }
            _ => None,
        }
    }

    fn cycle_selector(&mut self, forward: bool) {
        let form = &mut self.catalog.listing_form;
        match ListingField::ALL[self.listing_field % ListingField::ALL.len()] {
            ListingField::Shop => self.catalog.cycle_selected_shop(forward),
            ListingField::Category => {
                form.category = if forward {
                    form.category.cycle()
                } else {
                    form.category.cycle_back()
                };
            }
            ListingField::Status => {
                form.status = if forward {
                    form.status.cycle()
                } else {
                    form.status.cycle_back()
                };
            }
            _ => {}
        }
    }

    /// Runs the queued store round-trip, if any.
    pub async fn run_pending(&mut self) {
        let Some(command) = self.pending.take() else {
            return;
        };

        match command {
            Command::Refresh(scope) => {
                self.catalog.refresh(scope).await;
            }
            Command::CreateShop => {
                if self.catalog.create_shop().await == Outcome::Done {
                    self.popup = None;
                }
            }
            Command::CreateListing => {
                if self.catalog.create_listing().await == Outcome::Done {
                    self.popup = None;
                }
            }
            Command::Delete(DeleteTarget::Shop { id, .. }) => {
                self.catalog.delete_shop(&id).await;
            }
            Command::Delete(DeleteTarget::Listing { id, .. }) => {
                self.catalog.delete_listing(&id).await;
            }
        }

        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        self.shop_index = self
            .shop_index
            .min(self.catalog.shops.len().saturating_sub(1));
        self.listing_index = self
            .listing_index
            .min(self.catalog.listings.len().saturating_sub(1));
    }
}
