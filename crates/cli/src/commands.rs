use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum Commands {
    /// Iterate the rows through a list view and print every page
    Page {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        query: QueryArgs,

        #[arg(long, help = "Rows per page (defaults to the configured page size)")]
        size: Option<usize>,

        #[arg(long, default_value_t = 0, help = "Rows to skip before the first page")]
        offset: usize,

        #[arg(long, help = "Key of the first row to return")]
        from: Option<String>,

        #[arg(
            long = "rename",
            help = "Expose a field under another name, as SOURCE=VIEW (repeatable)"
        )]
        renames: Vec<String>,

        #[arg(long = "attribute", help = "Attribute to return (repeatable, `!name` excludes)")]
        attributes: Vec<String>,
    },
    /// Look rows up by key
    Keys {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(required = true, help = "Keys to look up")]
        keys: Vec<String>,

        #[arg(long, help = "Scan the rows page by page instead of using the key index")]
        scan: bool,
    },
    /// Print one window of rows
    Offset {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        query: QueryArgs,

        #[arg(long, default_value_t = 0)]
        offset: usize,

        #[arg(long, default_value_t = 10)]
        size: usize,

        #[arg(long, help = "Skip through pages instead of using random access")]
        scan: bool,
    },
}

#[derive(Args)]
pub struct SourceArgs {
    #[arg(long, help = "JSON file holding an array of objects")]
    pub rows: String,

    #[arg(long, help = "Field used as row key (row position when omitted)")]
    pub key_field: Option<String>,

    #[arg(long, help = "Settings file (JSON)")]
    pub config: Option<String>,

    #[arg(long, help = "Additional .env file with DPV_* variables")]
    pub env_file: Option<String>,
}

#[derive(Args)]
pub struct QueryArgs {
    #[arg(long, help = "Sort criterion, as ATTRIBUTE[:asc|desc] (repeatable)")]
    pub sort: Vec<String>,

    #[arg(
        long,
        help = "Filter criterion, as ATTRIBUTE:$OP[:VALUE] (repeatable, combined with AND)"
    )]
    pub filter: Vec<String>,

    #[arg(long, help = "Keep rows where any field contains this text")]
    pub text: Option<String>,
}
