use std::fmt::Write;

#[derive(Debug, Clone)]
struct OptionGuide {
    flag: &'static str,
    description: &'static str,
}

#[derive(Debug, Clone)]
struct CommandGuide {
    names: &'static [&'static str],
    summary: &'static str,
    usage: &'static [&'static str],
    options: &'static [OptionGuide],
    examples: &'static [&'static str],
}

const GLOBAL_OPTIONS: &[OptionGuide] = &[
    OptionGuide {
        flag: "-h, --help",
        description: "Show contextual help information.",
    },
    OptionGuide {
        flag: "-V, --version",
        description: "Print the implcheck version.",
    },
];

const ENVIRONMENT: &[OptionGuide] = &[
    OptionGuide {
        flag: "IMPLCHECK_ERROR_FORMAT",
        description: "Default diagnostic format (human, short, json).",
    },
    OptionGuide {
        flag: "IMPLCHECK_DIAGNOSTICS_FATAL",
        description: "Set to 1 to exit with failure when diagnostics are reported.",
    },
    OptionGuide {
        flag: "IMPLCHECK_LOG_FORMAT",
        description: "Log output format (auto, text, json).",
    },
    OptionGuide {
        flag: "IMPLCHECK_LOG_LEVEL",
        description: "Log verbosity (off, error, warn, info, debug, trace).",
    },
    OptionGuide {
        flag: "RUST_LOG",
        description: "Full tracing filter; overrides the log level.",
    },
];

const COMMAND_GUIDES: &[CommandGuide] = &[
    CommandGuide {
        names: &["check"],
        summary: "Check symbol-graph documents for members missing an [Impl<...>] marker.",
        usage: &["implcheck check <graph.json|graph.yaml>... [options]"],
        options: &[
            OptionGuide {
                flag: "--error-format <fmt>",
                description: "Diagnostic format: human, short, json.",
            },
            OptionGuide {
                flag: "--color <when>",
                description: "Colorize diagnostics: auto, always, never.",
            },
            OptionGuide {
                flag: "--marker <name>",
                description: "Marker attribute metadata name (default System.Runtime.CompilerServices.ImplAttribute).",
            },
            OptionGuide {
                flag: "-j, --jobs <n>",
                description: "Worker threads (default: available parallelism).",
            },
            OptionGuide {
                flag: "--fatal",
                description: "Exit with failure when any diagnostic is reported.",
            },
            OptionGuide {
                flag: "--log-format <fmt>",
                description: "Log output format: auto, text, json.",
            },
            OptionGuide {
                flag: "--log-level <level>",
                description: "Log verbosity: off, error, warn, info, debug, trace.",
            },
        ],
        examples: &[
            "implcheck check program.yaml",
            "implcheck check a.json b.json --error-format json --fatal",
            "implcheck check program.yaml --marker Acme.ImplementsAttribute",
        ],
    },
    CommandGuide {
        names: &["rules"],
        summary: "List the rules implemented by the checker.",
        usage: &["implcheck rules"],
        options: &[],
        examples: &["implcheck rules"],
    },
    CommandGuide {
        names: &["help"],
        summary: "Show general help or help for a command.",
        usage: &["implcheck help [command]"],
        options: &[],
        examples: &["implcheck help check"],
    },
    CommandGuide {
        names: &["version"],
        summary: "Print the implcheck version.",
        usage: &["implcheck version", "implcheck --version"],
        options: &[],
        examples: &[],
    },
];

pub(crate) fn render_general_help() -> String {
    let mut out = String::new();
    out.push_str("implcheck – explicit interface implementation checker\n\n");
    out.push_str("USAGE:\n  implcheck <command> [options]\n\n");
    out.push_str("COMMANDS:\n");
    for guide in COMMAND_GUIDES {
        let _ = writeln!(out, "  {:9} {}", guide.names[0], guide.summary);
    }
    out.push('\n');
    out.push_str("GLOBAL OPTIONS:\n");
    for option in GLOBAL_OPTIONS {
        let _ = writeln!(out, "  {:15} {}", option.flag, option.description);
    }
    out.push('\n');
    out.push_str("ENVIRONMENT:\n");
    for variable in ENVIRONMENT {
        let _ = writeln!(out, "  {:28} {}", variable.flag, variable.description);
    }
    out.push('\n');
    out.push_str("Use `implcheck help <command>` to view detailed usage and examples.\n");
    out
}

pub(crate) fn render_command_help(topic: &str) -> Option<String> {
    let guide = find_guide(topic)?;
    let mut out = String::new();
    let _ = writeln!(out, "implcheck {} – {}", guide.names[0], guide.summary);
    out.push('\n');

    out.push_str("USAGE:\n");
    for usage in guide.usage {
        let _ = writeln!(out, "  {usage}");
    }

    if !guide.options.is_empty() {
        out.push('\n');
        out.push_str("OPTIONS:\n");
        for option in guide.options {
            let _ = writeln!(out, "  {:22} {}", option.flag, option.description);
        }
    }

    if !guide.examples.is_empty() {
        out.push('\n');
        out.push_str("EXAMPLES:\n");
        for example in guide.examples {
            let _ = writeln!(out, "  {example}");
        }
    }
    Some(out)
}

pub(crate) fn format_unknown_topic(topic: &str) -> String {
    let mut known: Vec<_> = COMMAND_GUIDES.iter().map(|guide| guide.names[0]).collect();
    known.sort_unstable();
    format!(
        "unknown help topic '{topic}'; available commands: {}",
        known.join(", ")
    )
}

fn find_guide(topic: &str) -> Option<&'static CommandGuide> {
    COMMAND_GUIDES.iter().find(|guide| {
        guide
            .names
            .iter()
            .any(|name| name.eq_ignore_ascii_case(topic))
    })
}
