//! Order screen controller.
//!
//! Every event (user command, device callback, network completion) goes
//! through `ControllerImpl`. State is shared with completion closures through
//! `Rc<RefCell<..>>` and borrowed only when a future resolves, so checks such
//! as "are the text fields still empty" see the state at resolution time.

pub mod routes;
pub mod state;

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Instant;

use failure::Error as FailureError;
use futures::future::{self, Either};
use futures::prelude::*;
use futures::sync::oneshot;
use tokio_core::reactor::{Handle, Timeout};

use self::routes::Command;
use self::state::{ScreenSnapshot, ScreenState};
use config::Config;
use device::{GeolocationProvider, Permission};
use errors::Error;
use microservice::{InventoryMicroservice, OrdersMicroservice, ReverseGeocoder};
use models::*;
use services::geocode::ReverseGeocodeAdapter;
use services::inventory::InventoryService;
use services::location::{FixOutcome, LocationReconciler};
use services::map::{MapPicker, MapStatus};
use services::order::{OrderService, SubmissionOutcome};
use services::submission::{Blocker, OrderForm, OrderSubmissionGate};

pub type ControllerFuture<T> = Box<dyn Future<Item = T, Error = FailureError>>;

/// Choices offered after an order was placed
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum AckChoice {
    ViewOrders,
    NewOrder,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Navigation {
    Orders,
    OrderScreen,
}

/// External collaborators the screen talks to
#[derive(Clone)]
pub struct Collaborators {
    pub geolocation: Rc<dyn GeolocationProvider>,
    pub geocoder: Rc<dyn ReverseGeocoder>,
    pub orders: Rc<dyn OrdersMicroservice>,
    pub inventory: Rc<dyn InventoryMicroservice>,
}

pub struct ControllerImpl {
    pub config: Config,
    state: Rc<RefCell<ScreenState>>,
    geolocation: Rc<dyn GeolocationProvider>,
    geocode_adapter: ReverseGeocodeAdapter,
    inventory_service: InventoryService,
    order_service: OrderService,
    handle: Handle,
    map_timer: RefCell<Option<oneshot::Sender<()>>>,
}

/// Held by an outstanding permission request. Dropped unanswered, it puts
/// the permission back to `NoPermission` so the next `locate` asks again.
struct PermissionRequest {
    state: Rc<RefCell<ScreenState>>,
    answered: bool,
}

impl PermissionRequest {
    fn answer(mut self, res: Result<Permission, FailureError>) -> bool {
        self.answered = true;
        let mut screen = self.state.borrow_mut();
        match res {
            Ok(permission) => screen.location.apply_permission(permission),
            Err(e) => screen.location.permission_failed(&e),
        }
        screen.location.permission_granted()
    }
}

impl Drop for PermissionRequest {
    fn drop(&mut self) {
        if !self.answered {
            if let Ok(mut screen) = self.state.try_borrow_mut() {
                screen.location.abandon_permission_request();
            }
        }
    }
}

impl ControllerImpl {
    /// Mounts the screen for `customer`: the stored coordinate (when valid)
    /// seeds the marker and text fields, the stored address seeds the address
    /// field. Without them the configured default coordinate is used.
    pub fn new(config: Config, customer: Customer, collaborators: Collaborators, handle: &Handle) -> Result<Self, FailureError> {
        let location = LocationReconciler::new(customer.seed_coordinate(), config.default_coordinate())
            .with_spans(config.location.latitude_delta, config.location.longitude_delta);
        let form = OrderForm {
            delivery_address: customer
                .stored_address
                .as_ref()
                .map(|stored| stored.address.clone())
                .unwrap_or_default(),
            special_instructions: String::new(),
        };
        debug!("Order screen for customer {} starts at {}", customer.id, location.selected_location());

        let state = ScreenState {
            customer,
            location,
            map: MapPicker::new(config.map_ready_timeout()),
            cart: Cart::new(),
            form,
            gate: OrderSubmissionGate::new(),
            inventory: vec![],
            acknowledgment: None,
            last_failure: None,
        };

        Ok(Self {
            order_service: OrderService::new(collaborators.orders)?,
            inventory_service: InventoryService::new(collaborators.inventory),
            geocode_adapter: ReverseGeocodeAdapter::new(collaborators.geocoder),
            geolocation: collaborators.geolocation,
            state: Rc::new(RefCell::new(state)),
            handle: handle.clone(),
            map_timer: RefCell::new(None),
            config,
        })
    }

    pub fn state(&self) -> Ref<ScreenState> {
        self.state.borrow()
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        self.state.borrow().snapshot()
    }

    /// Loads inventory and asks for the current position side by side.
    pub fn mount(&self) -> ControllerFuture<()> {
        let res = self.reload_inventory().join(self.locate()).map(|(loaded, fix)| {
            debug!("Order screen mounted, inventory loaded: {}, position fix: {:?}", loaded, fix);
        });
        Box::new(res)
    }

    /// Resolves to `false` when the load failed and the previous list was kept.
    pub fn reload_inventory(&self) -> ControllerFuture<bool> {
        reload_inventory(self.state.clone(), &self.inventory_service)
    }

    /// Permission request followed by one best-effort position fix. Never
    /// fails: a denied permission or a failed fix leaves the screen as it is.
    pub fn locate(&self) -> ControllerFuture<FixOutcome> {
        let granted: ControllerFuture<bool> = {
            let mut screen = self.state.borrow_mut();
            if screen.location.permission_granted() {
                Box::new(future::ok(true))
            } else if !screen.location.begin_permission_request() {
                debug!("Location permission request already pending");
                Box::new(future::ok(false))
            } else {
                let request = PermissionRequest {
                    state: self.state.clone(),
                    answered: false,
                };
                Box::new(
                    self.geolocation
                        .request_permission()
                        .then(move |res| Ok::<_, FailureError>(request.answer(res))),
                )
            }
        };

        let state = self.state.clone();
        let geolocation = self.geolocation.clone();
        let geocode_adapter = self.geocode_adapter.clone();
        let accuracy = self.config.location.gps_accuracy;

        let res = granted.and_then(move |granted| -> ControllerFuture<FixOutcome> {
            if !granted {
                return Box::new(future::ok(FixOutcome::Ignored));
            }

            let fix = geolocation.current_position(accuracy).then(move |fix| -> ControllerFuture<FixOutcome> {
                let (outcome, geocode_target) = {
                    let mut screen = state.borrow_mut();
                    let outcome = screen.location.apply_position_fix(fix);
                    let geocode_target = match outcome {
                        FixOutcome::Applied { .. } if screen.form.delivery_address.trim().is_empty() => {
                            Some(screen.location.selected_location())
                        }
                        _ => None,
                    };
                    (outcome, geocode_target)
                };

                match geocode_target {
                    Some(coordinate) => Box::new(geocode_adapter.resolve(coordinate).then(move |address| {
                        if let Ok(address) = address {
                            let mut screen = state.borrow_mut();
                            if screen.form.delivery_address.trim().is_empty() {
                                screen.form.delivery_address = address;
                            } else {
                                debug!("Address was typed meanwhile, dropping geocoded \"{}\"", address);
                            }
                        }
                        Ok::<_, FailureError>(outcome)
                    })),
                    None => Box::new(future::ok(outcome)),
                }
            });
            Box::new(fix)
        });

        Box::new(res)
    }

    /// Map tap. An invalid coordinate is rejected and nothing changes; a
    /// valid one moves the marker, fills both text fields and resolves to the
    /// geocoded address. The address is applied only if no newer tap moved
    /// the marker in the meantime.
    pub fn tap_map(&self, coordinate: Coordinate) -> ControllerFuture<String> {
        let tapped = self.state.borrow_mut().location.map_tap(coordinate);
        let coordinate = match tapped {
            Ok(coordinate) => coordinate,
            Err(e) => {
                warn!("Rejected map tap at {}", coordinate);
                return Box::new(future::err::<String, _>(FailureError::from(e)));
            }
        };

        let state = self.state.clone();
        let res = self.geocode_adapter.resolve(coordinate).then(move |address| {
            let address = address.unwrap_or_else(|_| coordinate_label(&coordinate));
            let mut screen = state.borrow_mut();
            if screen.location.selected_location() == coordinate {
                screen.form.delivery_address = address.clone();
            } else {
                debug!("Marker moved since tap at {}, dropping \"{}\"", coordinate, address);
            }
            Ok::<_, FailureError>(address)
        });
        Box::new(res)
    }

    pub fn update_map_region(&self, latitude: f64, longitude: f64) -> Coordinate {
        self.state.borrow_mut().location.update_map_region(latitude, longitude)
    }

    /// Opens the picker in `Loading` and arms the ready timeout on the
    /// reactor. Reopening drops the timer of the previous open.
    pub fn open_map(&self, now: Instant) {
        self.state.borrow_mut().map.open(now);
        self.cancel_map_timer();

        let ready_timeout = self.config.map_ready_timeout();
        let timer = match Timeout::new(ready_timeout, &self.handle) {
            Ok(timer) => timer,
            Err(e) => {
                warn!("Could not arm map ready timeout: {}", e);
                return;
            }
        };
        let (cancel, cancelled) = oneshot::channel::<()>();
        *self.map_timer.borrow_mut() = Some(cancel);

        let due = now + ready_timeout;
        let state = self.state.clone();
        let expiry = timer.select2(cancelled).then(move |res| {
            if let Ok(Either::A(_)) = res {
                state.borrow_mut().map.tick(due);
            }
            Ok::<_, ()>(())
        });
        self.handle.spawn(expiry);
    }

    pub fn map_ready(&self) {
        self.state.borrow_mut().map.mark_ready();
        self.cancel_map_timer();
    }

    pub fn close_map(&self) {
        self.state.borrow_mut().map.close();
        self.cancel_map_timer();
    }

    fn cancel_map_timer(&self) {
        self.map_timer.borrow_mut().take();
    }

    pub fn tick(&self, now: Instant) -> MapStatus {
        self.state.borrow_mut().map.tick(now)
    }

    /// Map picker confirm: the marker becomes the manual entry.
    pub fn confirm_map_location(&self) -> Coordinate {
        let mut screen = self.state.borrow_mut();
        let selected = screen.location.confirm_selected_location();
        screen.map.close();
        self.cancel_map_timer();
        selected
    }

    /// Manual-entry fallback confirm. Invalid text leaves the picker open.
    pub fn apply_manual_coordinates(&self) -> Result<Coordinate, FailureError> {
        let mut screen = self.state.borrow_mut();
        let coordinate = screen.location.apply_manual_coordinates()?;
        screen.map.close();
        self.cancel_map_timer();
        Ok(coordinate)
    }

    pub fn set_latitude_text(&self, text: &str) {
        self.state.borrow_mut().location.set_latitude_text(text);
    }

    pub fn set_longitude_text(&self, text: &str) {
        self.state.borrow_mut().location.set_longitude_text(text);
    }

    pub fn set_delivery_address(&self, address: &str) {
        self.state.borrow_mut().form.delivery_address = address.to_string();
    }

    pub fn set_special_instructions(&self, instructions: &str) {
        self.state.borrow_mut().form.special_instructions = instructions.to_string();
    }

    pub fn add_to_cart(&self, cylinder_id: CylinderId) -> Result<u32, FailureError> {
        let mut screen = self.state.borrow_mut();
        let cylinder = screen.cylinder(cylinder_id).cloned().ok_or(Error::UnknownCylinder)?;
        screen.cart.add(&cylinder).map_err(|e| {
            info!("Not adding {}: {}", cylinder.name, e);
            FailureError::from(e)
        })
    }

    pub fn increment(&self, cylinder_id: CylinderId) -> Result<u32, FailureError> {
        Ok(self.state.borrow_mut().cart.increment(cylinder_id)?)
    }

    /// `None` means the line was removed.
    pub fn decrement(&self, cylinder_id: CylinderId) -> Result<Option<u32>, FailureError> {
        Ok(self.state.borrow_mut().cart.decrement(cylinder_id)?)
    }

    pub fn set_quantity(&self, cylinder_id: CylinderId, quantity: i64) -> Result<Option<u32>, FailureError> {
        Ok(self.state.borrow_mut().cart.set_quantity(cylinder_id, quantity)?)
    }

    pub fn blockers(&self) -> Vec<Blocker> {
        self.state.borrow().blockers()
    }

    pub fn can_submit(&self) -> bool {
        self.state.borrow().can_submit()
    }

    /// Sends the order. A blocked or overlapping submit fails immediately with
    /// `Error::Validate` or `Error::SubmissionInFlight`. An order the API
    /// rejects resolves to `SubmissionOutcome::Failed`; a stock conflict
    /// reloads inventory first.
    pub fn submit(&self) -> ControllerFuture<SubmissionOutcome> {
        let (draft, token) = {
            let mut screen = self.state.borrow_mut();
            let screen = &mut *screen;
            let draft = match screen.gate.begin(&screen.customer, &screen.cart, &screen.form, &screen.location) {
                Ok(draft) => draft,
                Err(e) => {
                    info!("Submission rejected: {}", e);
                    return Box::new(future::err::<SubmissionOutcome, _>(FailureError::from(e)));
                }
            };
            screen.last_failure = None;
            (draft, screen.customer.token.clone())
        };

        let submission_id = draft.submission_id;
        let state = self.state.clone();
        let order_service = self.order_service.clone();
        let inventory_service = self.inventory_service.clone();

        let res = self
            .order_service
            .place(draft, &token)
            .then(move |res| -> ControllerFuture<SubmissionOutcome> {
                let mut screen = state.borrow_mut();
                screen.gate.finish(submission_id);
                match res {
                    Ok(placed) => {
                        screen.cart.clear();
                        screen.acknowledgment = Some(placed.clone());
                        Box::new(future::ok(SubmissionOutcome::Placed(placed)))
                    }
                    Err(e) => {
                        warn!("Submission {} failed: {}", submission_id, e);
                        let notice = order_service.failure_notice(&e);
                        screen.last_failure = Some(notice.message.clone());
                        drop(screen);

                        if notice.stock_conflict {
                            let message = notice.message;
                            Box::new(
                                reload_inventory(state.clone(), &inventory_service).map(move |inventory_refreshed| {
                                    SubmissionOutcome::Failed {
                                        message,
                                        inventory_refreshed,
                                    }
                                }),
                            )
                        } else {
                            Box::new(future::ok(SubmissionOutcome::Failed {
                                message: notice.message,
                                inventory_refreshed: false,
                            }))
                        }
                    }
                }
            });

        Box::new(res)
    }

    /// Dismisses the success acknowledgment. Starting a new order also clears
    /// the special instructions and reloads inventory.
    pub fn acknowledge(&self, choice: AckChoice) -> ControllerFuture<Navigation> {
        let pending = self.state.borrow_mut().acknowledgment.take();
        if pending.is_none() {
            debug!("No order acknowledgment pending for {:?}", choice);
        }

        match choice {
            AckChoice::ViewOrders => Box::new(future::ok(Navigation::Orders)),
            AckChoice::NewOrder => {
                self.state.borrow_mut().form.special_instructions.clear();
                Box::new(self.reload_inventory().map(|_| Navigation::OrderScreen))
            }
        }
    }

    /// Runs one parsed command and resolves to the notice to show, if any.
    pub fn call(&self, command: Command) -> ControllerFuture<Option<String>> {
        match command {
            Command::Show | Command::Quit => Box::new(future::ok(None)),
            Command::Locate => Box::new(self.locate().map(|outcome| match outcome {
                FixOutcome::Applied { .. } => None,
                FixOutcome::Ignored => Some("Current location unavailable, keeping the selected location".to_string()),
            })),

            Command::MapOpen => {
                self.open_map(Instant::now());
                Box::new(future::ok(None))
            }
            Command::MapReady => {
                self.map_ready();
                Box::new(future::ok(None))
            }
            Command::MapClose => {
                self.close_map();
                Box::new(future::ok(None))
            }
            Command::Tap(coordinate) => Box::new(self.tap_map(coordinate).map(Some)),
            Command::Confirm => {
                let selected = self.confirm_map_location();
                Box::new(future::ok(Some(format!("Location set to {}", selected))))
            }
            Command::Manual => respond(self.apply_manual_coordinates().map(|c| Some(format!("Location set to {}", c)))),

            Command::Latitude(text) => {
                self.set_latitude_text(&text);
                Box::new(future::ok(None))
            }
            Command::Longitude(text) => {
                self.set_longitude_text(&text);
                Box::new(future::ok(None))
            }
            Command::Address(text) => {
                self.set_delivery_address(&text);
                Box::new(future::ok(None))
            }
            Command::Note(text) => {
                self.set_special_instructions(&text);
                Box::new(future::ok(None))
            }

            Command::Add(id) => respond(self.add_to_cart(id).map(|_| None)),
            Command::Increment(id) => respond(self.increment(id).map(|_| None)),
            Command::Decrement(id) => respond(self.decrement(id).map(|_| None)),
            Command::Quantity(id, quantity) => respond(self.set_quantity(id, quantity).map(|_| None)),

            Command::Submit => {
                let blockers = self.blockers();
                if !blockers.is_empty() {
                    let notice = blockers.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n");
                    return Box::new(future::ok(Some(notice)));
                }
                Box::new(self.submit().map(|outcome| Some(outcome.to_string())))
            }
            Command::ViewOrders => Box::new(self.acknowledge(AckChoice::ViewOrders).map(|nav| Some(format!("Navigate to {:?}", nav)))),
            Command::NewOrder => Box::new(self.acknowledge(AckChoice::NewOrder).map(|_| None)),
        }
    }
}

fn respond(res: Result<Option<String>, FailureError>) -> ControllerFuture<Option<String>> {
    Box::new(future::result(res))
}

/// Reloads the orderable cylinders and reconciles the cart with the new
/// stock. A failed load is logged and keeps the previous list.
fn reload_inventory(state: Rc<RefCell<ScreenState>>, inventory_service: &InventoryService) -> ControllerFuture<bool> {
    let token = state.borrow().customer.token.clone();
    let res = inventory_service.load(&token).then(move |res| {
        let cylinders = match res {
            Ok(cylinders) => cylinders,
            Err(e) => {
                warn!("Could not load inventory, keeping previous list: {}", e);
                return Ok::<_, FailureError>(false);
            }
        };

        let mut screen = state.borrow_mut();
        let changed = screen.cart.reconcile_stock(&cylinders);
        if !changed.is_empty() {
            info!("Cart adjusted to new stock for {} cylinder(s)", changed.len());
        }
        screen.inventory = cylinders;
        Ok(true)
    });
    Box::new(res)
}
