use clap::{
    command,
    Parser,
};
use launchpad_client::{
    metadata::{
        TokenDetails,
        TokenForm,
        DEFAULT_DECIMALS,
    },
    CreateTokenError,
};

#[derive(Debug, Parser)]
#[command(name = "token-launchpad")]
pub struct CliArgs {
    /// Token name.
    #[arg(short = 'n', long)]
    pub name: String,

    /// Token symbol.
    #[arg(short = 's', long)]
    pub symbol: String,

    /// Image URL. Used as the metadata URI when set.
    #[arg(short = 'i', long)]
    pub image_url: Option<String>,

    /// Initial supply. Reported back only; nothing is minted.
    #[arg(long)]
    pub initial_supply: Option<String>,

    #[arg(short = 'd', long, default_value_t = DEFAULT_DECIMALS)]
    pub decimals: u8,

    /// Overrides the `RPC_URL` environment variable.
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Print each step of the creation attempt.
    #[arg(long)]
    pub debug_logs: bool,
}

impl CliArgs {
    pub fn form(&self) -> TokenForm {
        TokenForm {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            image_url: self.image_url.clone(),
            initial_supply: self.initial_supply.clone(),
        }
    }

    /// The validated form: its token details and parsed initial supply.
    pub fn parse_form(&self) -> Result<(TokenDetails, Option<u64>), CreateTokenError> {
        let form = self.form();
        Ok((form.to_details()?, form.initial_supply()?))
    }
}
