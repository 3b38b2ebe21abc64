//! roomdesk - room, booking and billing desk
//!
//! Command-line front end over the desk trackers. Every command prints the
//! resulting record(s) as JSON on stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

use roomdesk_lib::config::Config;
use roomdesk_lib::logger::init_logger;
use roomdesk_lib::models::{
    BookingFilter, BookingStatus, CreateBooking, CreateRoom, CreateServiceOrder, CreateStaffTask,
    InvoiceStatus, NewLineItem, RecordId, RoomFilter, RoomStatus, ServiceOrderStatus,
    TaskFilter, TaskPriority, TaskStatus,
};
use roomdesk_lib::Desk;

/// roomdesk - room, booking and billing desk
#[derive(Parser, Debug)]
#[command(name = "roomdesk")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite database (default from ROOMDESK_DATABASE)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Room inventory
    #[command(subcommand)]
    Room(RoomCommand),

    /// Booking ledger
    #[command(subcommand)]
    Booking(BookingCommand),

    /// Service orders
    #[command(subcommand)]
    Order(OrderCommand),

    /// Invoices and payments
    #[command(subcommand)]
    Invoice(InvoiceCommand),

    /// Staff tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Revenue and occupancy reports
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand, Debug)]
enum RoomCommand {
    /// List rooms
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        status: Option<RoomStatus>,
        #[arg(long)]
        building: Option<String>,
    },
    /// Show one room
    Show { id: RecordId },
    /// Add a room (starts available)
    Create {
        name: String,
        #[arg(long)]
        capacity: u32,
        #[arg(long)]
        building: String,
    },
    /// Set a room's status
    Status {
        id: RecordId,
        status: RoomStatus,
        /// Booking occupying the room (required for `occupied`)
        #[arg(long)]
        booking: Option<RecordId>,
    },
    /// Remove a room without active bookings
    Delete { id: RecordId },
}

#[derive(Subcommand, Debug)]
enum BookingCommand {
    /// List bookings
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        room: Option<RecordId>,
        #[arg(long)]
        status: Option<BookingStatus>,
    },
    /// Show one booking
    Show { id: RecordId },
    /// Request a booking (starts pending)
    Create(CreateBookingArgs),
    /// Confirm a pending booking
    Approve { id: RecordId },
    /// Reject a pending booking
    Reject {
        id: RecordId,
        #[arg(long)]
        reason: String,
    },
    /// Guest arrival
    CheckIn { id: RecordId },
    /// Guest departure
    CheckOut { id: RecordId },
    /// Cancel a booking
    Cancel { id: RecordId },
}

#[derive(Args, Debug)]
struct CreateBookingArgs {
    #[arg(long)]
    room: RecordId,
    #[arg(long)]
    customer: String,
    #[arg(long, default_value_t = 1)]
    guests: u32,
    /// Arrival date (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,
    /// Departure date (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,
}

#[derive(Subcommand, Debug)]
enum OrderCommand {
    /// List service orders
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        status: Option<ServiceOrderStatus>,
    },
    /// Show one service order
    Show { id: RecordId },
    /// Open a service order
    Create {
        #[arg(long)]
        customer: String,
        #[arg(long)]
        room_code: Option<String>,
        #[arg(long)]
        booking: Option<RecordId>,
        /// Line item as NAME:QUANTITY:UNIT_PRICE (repeatable)
        #[arg(long = "item", value_parser = parse_line_item)]
        items: Vec<NewLineItem>,
    },
    /// Add a line item
    AddItem {
        id: RecordId,
        #[arg(long)]
        service: String,
        #[arg(long, default_value_t = 1)]
        quantity: i64,
        #[arg(long)]
        price: Decimal,
    },
    /// Remove a line item
    RemoveItem { id: RecordId, item: RecordId },
    /// Move the order to another status
    Status {
        id: RecordId,
        status: ServiceOrderStatus,
    },
}

#[derive(Subcommand, Debug)]
enum InvoiceCommand {
    /// List invoices
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        status: Option<InvoiceStatus>,
    },
    /// Show one invoice
    Show { id: RecordId },
    /// Create an invoice from line items
    Create {
        #[arg(long)]
        customer: String,
        /// Line item as NAME:QUANTITY:UNIT_PRICE (repeatable)
        #[arg(long = "item", value_parser = parse_line_item, required = true)]
        items: Vec<NewLineItem>,
    },
    /// Invoice a completed service order
    FromOrder { order: RecordId },
    /// Record payment
    Pay {
        id: RecordId,
        /// cash or transfer
        #[arg(long)]
        method: String,
        #[arg(long)]
        reference: Option<String>,
    },
    /// Void an unpaid invoice
    Void { id: RecordId },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// List staff tasks
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Show one task
    Show { id: RecordId },
    /// Create a task (starts todo)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        assignee: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: NaiveDate,
        #[arg(long, default_value = "medium")]
        priority: TaskPriority,
        #[arg(long)]
        description: Option<String>,
    },
    /// Move a task to another status
    Status { id: RecordId, status: TaskStatus },
    /// Hand a task to someone else
    Assign { id: RecordId, assignee: String },
    /// Delete a task
    Delete { id: RecordId },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Paid revenue between two dates, inclusive
    Revenue {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Rooms per status
    Occupancy,
}

fn parse_line_item(s: &str) -> std::result::Result<NewLineItem, String> {
    let mut parts = s.rsplitn(3, ':');
    let (Some(price), Some(quantity), Some(name)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected NAME:QUANTITY:UNIT_PRICE, got '{s}'"));
    };

    let quantity = quantity
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid quantity '{quantity}': {e}"))?;
    let price = price
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("invalid unit price '{price}': {e}"))?;

    Ok(NewLineItem::new(name, quantity, price))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_room(desk: &Desk, command: RoomCommand) -> Result<()> {
    match command {
        RoomCommand::List { status, building } => {
            print_json(&desk.rooms.list(&RoomFilter { status, building })?)
        }
        RoomCommand::Show { id } => print_json(&desk.rooms.get(id)?),
        RoomCommand::Create {
            name,
            capacity,
            building,
        } => print_json(&desk.rooms.create(CreateRoom {
            name,
            capacity,
            building,
        })?),
        RoomCommand::Status {
            id,
            status,
            booking,
        } => print_json(&desk.rooms.update_status(id, status, booking)?),
        RoomCommand::Delete { id } => {
            desk.rooms.delete(id)?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
    }
}

fn run_booking(desk: &Desk, command: BookingCommand) -> Result<()> {
    let ledger = &desk.bookings;
    match command {
        BookingCommand::List { room, status } => print_json(&ledger.list(&BookingFilter {
            room_id: room,
            status,
        })?),
        BookingCommand::Show { id } => print_json(&ledger.get(id)?),
        BookingCommand::Create(args) => print_json(&ledger.create(CreateBooking {
            room_id: args.room,
            customer_name: args.customer,
            guests: args.guests,
            start: args.start,
            end: args.end,
        })?),
        BookingCommand::Approve { id } => print_json(&ledger.approve(id)?),
        BookingCommand::Reject { id, reason } => print_json(&ledger.reject(id, &reason)?),
        BookingCommand::CheckIn { id } => print_json(&ledger.check_in(id)?),
        BookingCommand::CheckOut { id } => print_json(&ledger.check_out(id)?),
        BookingCommand::Cancel { id } => print_json(&ledger.cancel(id)?),
    }
}

fn run_order(desk: &Desk, command: OrderCommand) -> Result<()> {
    let orders = &desk.service_orders;
    match command {
        OrderCommand::List { status } => print_json(&orders.list(status)?),
        OrderCommand::Show { id } => print_json(&orders.get(id)?),
        OrderCommand::Create {
            customer,
            room_code,
            booking,
            items,
        } => print_json(&orders.create(CreateServiceOrder {
            customer_name: customer,
            room_code,
            booking_id: booking,
            items,
        })?),
        OrderCommand::AddItem {
            id,
            service,
            quantity,
            price,
        } => print_json(&orders.add_line_item(id, &service, quantity, price)?),
        OrderCommand::RemoveItem { id, item } => print_json(&orders.remove_line_item(id, item)?),
        OrderCommand::Status { id, status } => print_json(&orders.transition(id, status)?),
    }
}

fn run_invoice(desk: &Desk, command: InvoiceCommand) -> Result<()> {
    let invoices = &desk.invoices;
    match command {
        InvoiceCommand::List { status } => print_json(&invoices.list(status)?),
        InvoiceCommand::Show { id } => print_json(&invoices.get(id)?),
        InvoiceCommand::Create { customer, items } => {
            print_json(&invoices.create_from_items(&customer, &items)?)
        }
        InvoiceCommand::FromOrder { order } => {
            print_json(&invoices.create_from_service_order(order)?)
        }
        InvoiceCommand::Pay {
            id,
            method,
            reference,
        } => print_json(&invoices.mark_paid(id, &method, reference.as_deref())?),
        InvoiceCommand::Void { id } => print_json(&invoices.void(id)?),
    }
}

fn run_task(desk: &Desk, command: TaskCommand) -> Result<()> {
    let tasks = &desk.tasks;
    match command {
        TaskCommand::List { assignee, status } => {
            print_json(&tasks.list(&TaskFilter { assignee, status })?)
        }
        TaskCommand::Show { id } => print_json(&tasks.get(id)?),
        TaskCommand::Create {
            title,
            assignee,
            due,
            priority,
            description,
        } => print_json(&tasks.create(CreateStaffTask {
            title,
            assignee,
            due_date: due,
            priority,
            description,
        })?),
        TaskCommand::Status { id, status } => print_json(&tasks.transition(id, status)?),
        TaskCommand::Assign { id, assignee } => print_json(&tasks.assign(id, &assignee)?),
        TaskCommand::Delete { id } => {
            tasks.delete(id)?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env().with_overrides(cli.db, cli.log_level);
    init_logger(&config.log_level);

    let desk = Desk::open(&config).with_context(|| {
        format!("failed to open database {}", config.database_path.display())
    })?;

    match cli.command {
        Commands::Room(command) => run_room(&desk, command),
        Commands::Booking(command) => run_booking(&desk, command),
        Commands::Order(command) => run_order(&desk, command),
        Commands::Invoice(command) => run_invoice(&desk, command),
        Commands::Task(command) => run_task(&desk, command),
        Commands::Report(ReportCommand::Revenue { from, to }) => {
            print_json(&desk.reports.revenue(from, to)?)
        }
        Commands::Report(ReportCommand::Occupancy) => print_json(&desk.reports.occupancy()?),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<roomdesk_lib::error::DeskError>() {
                Some(desk_err) => eprintln!("error[{}]: {desk_err}", desk_err.kind()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
