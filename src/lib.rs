extern crate chrono;
extern crate config as config_crate;
extern crate env_logger;
#[macro_use]
extern crate failure;
extern crate futures;
extern crate geo;
extern crate hyper;
#[macro_use]
extern crate log;
extern crate regex;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate tokio_core;
extern crate uuid;
extern crate validator;

pub mod config;
pub mod controller;
pub mod device;
pub mod errors;
pub mod http;
pub mod microservice;
pub mod models;
pub mod services;

use std::io::{self, BufRead};
use std::process;
use std::rc::Rc;
use std::thread;

use futures::future;
use futures::prelude::*;
use futures::sync::mpsc;
use hyper::header::{Accept, Headers};
use tokio_core::reactor::Core;

use config::Config;
use controller::routes::{create_command_parser, Command};
use controller::{Collaborators, ControllerFuture, ControllerImpl};
use device::FixedGeolocation;
use http::{HttpClient, HttpClientWithDefaultHeaders, HyperClient};
use microservice::{GeocoderMicroserviceImpl, InventoryMicroserviceImpl, OrdersMicroserviceImpl};

/// Runs an order screen session from provided `Config`, reading commands
/// from stdin and printing the screen after each one.
pub fn start_session(config: Config) {
    // Prepare logger
    env_logger::init();

    let customer = match config.customer() {
        Some(customer) => customer,
        None => {
            error!("No [customer] section in config, cannot place orders");
            process::exit(1);
        }
    };

    // Prepare reactor
    let mut core = Core::new().expect("Unexpected error creating event loop core");
    let handle = core.handle();

    let mut headers = Headers::new();
    headers.set(Accept::json());
    let http_client: Box<dyn HttpClient> = Box::new(HttpClientWithDefaultHeaders::new(HyperClient::new(&handle), headers));

    let collaborators = Collaborators {
        geolocation: Rc::new(FixedGeolocation::from(&config.device)),
        geocoder: Rc::new(GeocoderMicroserviceImpl::new(http_client.cloned(), config.clone())),
        orders: Rc::new(OrdersMicroserviceImpl::new(http_client.cloned(), config.clone())),
        inventory: Rc::new(InventoryMicroserviceImpl::new(http_client.cloned(), config.clone())),
    };

    let controller = ControllerImpl::new(config, customer, collaborators, &handle).unwrap_or_else(|e| {
        error!("Order screen initialization error: {}", e);
        process::exit(1);
    });
    let parser = create_command_parser().unwrap_or_else(|e| {
        error!("Command table initialization error: {}", e);
        process::exit(1);
    });

    if let Err(e) = core.run(controller.mount()) {
        warn!("Order screen mounted with errors: {}", e);
    }
    print_snapshot(&controller);

    // Stdin blocks, so lines are read on their own thread and fed to the
    // reactor. Map timers keep firing while the runner waits for input.
    let (lines_tx, lines) = mpsc::channel::<String>(1);
    thread::spawn(move || {
        let stdin = io::stdin();
        let mut lines_tx = lines_tx;
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("Could not read command: {}", e);
                    break;
                }
            };
            lines_tx = match lines_tx.send(line).wait() {
                Ok(lines_tx) => lines_tx,
                Err(_) => break,
            };
        }
    });

    let controller = &controller;
    let parser = &parser;
    let session = lines
        .filter(|line| !line.trim().is_empty())
        .map(move |line| (parser.test(&line), line))
        .take_while(|&(ref command, _)| Ok(*command != Some(Command::Quit)))
        .for_each(move |(command, line)| {
            let call: ControllerFuture<Option<String>> = match command {
                Some(command) => controller.call(command),
                None => Box::new(future::ok(Some(format!("Unknown command: {}", line.trim())))),
            };
            call.then(move |res| {
                match res {
                    Ok(Some(notice)) => println!("{}", notice),
                    Ok(None) => (),
                    Err(e) => println!("{}", e),
                }
                print_snapshot(controller);
                Ok::<_, ()>(())
            })
        });
    if core.run(session).is_err() {
        error!("Command stream closed unexpectedly");
    }

    info!("Order screen session finished");
}

fn print_snapshot(controller: &ControllerImpl) {
    match serde_json::to_string_pretty(&controller.snapshot()) {
        Ok(snapshot) => println!("{}", snapshot),
        Err(e) => error!("Could not serialize screen: {}", e),
    }
}
