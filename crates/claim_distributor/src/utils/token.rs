use anchor_lang::prelude::Pubkey;
use anchor_spl::associated_token::get_associated_token_address;

/// Token account the transfer integration pays out from
/// - The wallet's associated token account for `mint`
pub fn source_token_account(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(wallet, mint)
}
