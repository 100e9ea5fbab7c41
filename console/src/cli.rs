//! Command-line definition

use campus_core::CatalogId;
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

/// Command-line definition of `campus-console`
#[must_use]
pub fn command() -> Command {
    Command::new("campus-console")
        .version(campus_core::VERSION)
        .about("Reservation admin panel: catalogs, incidents, audits, reports and exports")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a TOML configuration file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Output as JSON"),
        )
        .arg(
            Arg::new("role")
                .long("role")
                .global(true)
                .default_value("ADMINISTRATIVO")
                .help("Session role (SUPERVISOR, ADMINISTRATIVO, ...)"),
        )
        .arg(
            Arg::new("escuela-id")
                .long("escuela-id")
                .global(true)
                .value_parser(value_parser!(CatalogId))
                .help("School assigned to a supervisor"),
        )
        .arg(
            Arg::new("escuela-nombre")
                .long("escuela-nombre")
                .global(true)
                .help("Display name of the assigned school"),
        )
        .subcommand(
            Command::new("catalog")
                .about("Load faculty, school and space options")
                .arg(
                    Arg::new("facultad")
                        .long("facultad")
                        .value_parser(value_parser!(CatalogId))
                        .help("Only schools of this faculty"),
                ),
        )
        .subcommand(
            Command::new("incidents")
                .about("Query incidents with the cascading filter")
                .arg(Arg::new("facultad").long("facultad").help("Faculty id"))
                .arg(Arg::new("escuela").long("escuela").help("School id"))
                .arg(Arg::new("espacio").long("espacio").help("Space id"))
                .arg(Arg::new("search").long("search").help("Backend free-text search"))
                .arg(
                    Arg::new("filtro")
                        .long("filtro")
                        .help("Narrow the fetched rows locally"),
                ),
        )
        .subcommand(
            Command::new("audits")
                .about("Query the reservation audit trail")
                .arg(Arg::new("reserva").long("reserva").help("Reservation id"))
                .arg(Arg::new("estado").long("estado").help("State after the change"))
                .arg(Arg::new("usuario").long("usuario").help("Staff member"))
                .arg(Arg::new("desde").long("desde").help("From date, YYYY-MM-DD"))
                .arg(Arg::new("hasta").long("hasta").help("To date, YYYY-MM-DD"))
                .arg(
                    Arg::new("filtro")
                        .long("filtro")
                        .help("Narrow the fetched rows locally"),
                ),
        )
        .subcommand(Command::new("reports").about("Load usage statistics"))
        .subcommand(
            Command::new("export")
                .about("Download a PDF or Excel export")
                .arg(
                    Arg::new("dataset")
                        .required(true)
                        .value_parser(["audits", "reports"])
                        .help("Dataset to export"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("pdf")
                        .value_parser(["pdf", "excel"])
                        .help("Export format"),
                )
                .arg(
                    Arg::new("out-dir")
                        .long("out-dir")
                        .default_value(".")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory the file is written to"),
                ),
        )
}
