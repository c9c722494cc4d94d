//! Screen rendering
//!
//! Every text and keyboard the bot shows is built here. Views are pure: they
//! take domain values and return an [`OutboundMessage`].

use std::time::Duration;

use rust_decimal::Decimal;

use super::token_lookup::TokenReport;
use crate::domain::{
    short_address, Action, GasTier, InputError, Order, OrderList, Page, Settings, Wallet,
    WithdrawAsset,
};
use crate::ports::{Button, Keyboard, OutboundMessage, WithdrawalRequest};

pub const SLIPPAGE_PRESETS: [f64; 5] = [0.5, 1.0, 2.0, 3.0, 5.0];

/// A wallet with its native balance, `None` when the RPC was unavailable
pub type WalletLine = (Wallet, Option<Decimal>);

#[derive(Debug, Clone)]
pub struct Views {
    pub native_symbol: String,
    pub network_name: String,
    pub explorer_url: String,
    pub exchange: String,
    pub secret_ttl: Duration,
}

impl Default for Views {
    fn default() -> Self {
        Self {
            native_symbol: "MON".to_string(),
            network_name: "Monad Testnet".to_string(),
            explorer_url: "https://testnet.monadexplorer.com".to_string(),
            exchange: "Kuru DEX".to_string(),
            secret_ttl: Duration::from_secs(60),
        }
    }
}

fn balance_text(balance: Option<Decimal>) -> String {
    match balance {
        Some(b) => b.normalize().to_string(),
        None => "n/a".to_string(),
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Views {
    fn ttl_secs(&self) -> u64 {
        self.secret_ttl.as_secs()
    }

    fn error_with_back(&self, text: impl Into<String>, back: &Action) -> OutboundMessage {
        OutboundMessage::plain(text).with_keyboard(Keyboard::back_to(back))
    }

    // ---- main menu ------------------------------------------------------

    pub fn main_menu_keyboard(&self) -> Keyboard {
        Keyboard::new()
            .row(vec![
                Button::new("🛒 Buy a Token", &Action::Buy),
                Button::new("💰 Sell a Token", &Action::Sell),
            ])
            .row(vec![
                Button::new("👛 Wallets", &Action::Wallets),
                Button::new("📊 Portfolio", &Action::Portfolio),
            ])
            .row(vec![
                Button::new("👥 Referral", &Action::Referral),
                Button::new("📤 Withdraw", &Action::Withdraw),
            ])
            .row(vec![
                Button::new("📋 Manage Orders", &Action::ManageOrders),
                Button::new("⚙️ Config", &Action::Config),
            ])
            .button("📖 Trading Bot Guide", &Action::Guide)
    }

    pub fn welcome(&self, primary: &Wallet, balance: Option<Decimal>, new_user: bool) -> OutboundMessage {
        let mut text = format!(
            "Welcome to Monad Sniper Bot! 🚀\n\n\
             Trade tokens effortlessly on the Monad Blockchain, fast, secure and reliable.\n\n\
             🏦 Your Wallet:\n`{}`\n\n\
             💰 Balance: {} ${}\n\n\
             Bonus: Refer friends and earn UP TO 50% of Platform Revenue!",
            primary.address(),
            balance_text(balance),
            self.native_symbol
        );
        if new_user {
            text.push_str("\n\n⚠️ New wallet generated! Check above message for private key!");
        }
        OutboundMessage::markdown(text).with_keyboard(self.main_menu_keyboard())
    }

    pub fn main_menu(&self) -> OutboundMessage {
        OutboundMessage::plain("Welcome to Monad Sniper Bot! 🚀\n\nSelect an option:")
            .with_keyboard(self.main_menu_keyboard())
    }

    // ---- key disclosure -------------------------------------------------

    pub fn generated_key(&self, wallet: &Wallet, first_wallet: bool) -> OutboundMessage {
        let title = if first_wallet {
            "🔐 Your Wallet Has Been Generated!"
        } else {
            "🔐 Your New Wallet Has Been Generated!"
        };
        OutboundMessage::markdown(format!(
            "{}\n\n\
             Address:\n`{}`\n\n\
             Private Key:\n`{}`\n\n\
             ⚠️ WARNING:\n\
             • Never share your private key with anyone\n\
             • Store it securely offline\n\
             • We will delete this message in {} seconds",
            title,
            wallet.address(),
            wallet.private_key(),
            self.ttl_secs()
        ))
    }

    pub fn batch_keys(&self, wallets: &[Wallet]) -> OutboundMessage {
        let mut text = String::from("🔐 Your New Wallets:\n\n");
        for (i, wallet) in wallets.iter().enumerate() {
            text.push_str(&format!(
                "Wallet {}:\nAddress: `{}`\nPrivate Key: `{}`\n\n",
                i + 1,
                wallet.address(),
                wallet.private_key()
            ));
        }
        text.push_str(&format!(
            "⚠️ WARNING: Save these keys securely! Message will be deleted in {} seconds.",
            self.ttl_secs()
        ));
        OutboundMessage::markdown(text)
    }

    pub fn shown_key(&self, wallet: &Wallet) -> OutboundMessage {
        OutboundMessage::markdown(format!(
            "🔐 Wallet Private Key\n\n\
             Address:\n`{}`\n\n\
             Private Key:\n`{}`\n\n\
             ⚠️ This message will be deleted in {} seconds",
            wallet.address(),
            wallet.private_key(),
            self.ttl_secs()
        ))
    }

    pub fn key_sent_notice(&self) -> OutboundMessage {
        OutboundMessage::plain(format!(
            "✅ Private key has been sent in a separate message.\n\
             It will be automatically deleted in {} seconds.",
            self.ttl_secs()
        ))
        .with_keyboard(Keyboard::back_to(&Action::Wallets))
    }

    // ---- wallets --------------------------------------------------------

    pub fn wallet_menu_keyboard(&self) -> Keyboard {
        Keyboard::new()
            .row(vec![
                Button::new("➕ New Wallet", &Action::NewWallet),
                Button::new("➕ New X Wallets", &Action::NewWallets),
            ])
            .row(vec![
                Button::new("🔑 Import Wallet", &Action::ImportWallet),
                Button::new("🗑️ Delete Wallet", &Action::DeleteWallet),
            ])
            .button("👁️ Show Private Key", &Action::ShowPrivateKey)
            .button("🔙 Main Menu", &Action::MainMenu)
    }

    pub fn wallets(&self, wallets: &[WalletLine]) -> OutboundMessage {
        let mut text = String::from("👛 Wallets Management\n\n");
        if wallets.is_empty() {
            text.push_str("No wallets connected. Create or import a wallet to start trading!\n\n");
        } else {
            text.push_str("Connected Wallets:\n");
            for (i, (wallet, balance)) in wallets.iter().enumerate() {
                text.push_str(&format!(
                    "{}. `{}`\n   Balance: {} {}\n",
                    i + 1,
                    wallet.short_address(),
                    balance_text(*balance),
                    self.native_symbol
                ));
            }
            text.push('\n');
        }
        text.push_str("Choose an option below:");
        OutboundMessage::markdown(text).with_keyboard(self.wallet_menu_keyboard())
    }

    pub fn ask_wallet_count(&self, max: usize) -> OutboundMessage {
        self.error_with_back(
            format!(
                "How many wallets would you like to create?\n\nReply with a number between 1 and {}.",
                max
            ),
            &Action::Wallets,
        )
    }

    pub fn ask_private_key(&self) -> OutboundMessage {
        self.error_with_back(
            "To import a wallet, please send your private key as 64 hex characters \
             without the 0x prefix.\n\n\
             ⚠️ WARNING: Only send your private key in a private message, never in a group!\n\n\
             Reply with your private key or click Back to cancel.",
            &Action::Wallets,
        )
    }

    pub fn import_success(&self, wallet: &Wallet) -> OutboundMessage {
        OutboundMessage::markdown(format!(
            "✅ Wallet imported successfully!\n\nAddress:\n`{}`",
            wallet.address()
        ))
        .with_keyboard(self.wallet_menu_keyboard())
    }

    pub fn batch_created(&self) -> OutboundMessage {
        OutboundMessage::plain("Select an option:").with_keyboard(self.wallet_menu_keyboard())
    }

    fn wallet_picker(&self, wallets: &[Wallet], action: impl Fn(usize) -> Action) -> Keyboard {
        wallets
            .iter()
            .enumerate()
            .fold(Keyboard::new(), |keyboard, (i, wallet)| {
                keyboard.button(format!("💼 {}", wallet.short_address()), &action(i))
            })
    }

    pub fn select_wallet_to_delete(&self, wallets: &[Wallet]) -> OutboundMessage {
        let keyboard = self
            .wallet_picker(wallets, Action::ConfirmDelete)
            .row(vec![Button::back(&Action::Wallets)]);
        OutboundMessage::plain(
            "Select a wallet to delete:\n\n⚠️ Warning: This action cannot be undone!\n\
             Make sure you have saved the private key if needed.",
        )
        .with_keyboard(keyboard)
    }

    pub fn confirm_delete(&self, wallet: &Wallet, index: usize) -> OutboundMessage {
        OutboundMessage::markdown(format!(
            "Are you sure you want to delete wallet:\n\n`{}`?\n\n⚠️ This action cannot be undone!",
            wallet.short_address()
        ))
        .with_keyboard(Keyboard::new().row(vec![
            Button::new("✅ Yes, Delete", &Action::ExecuteDelete(index)),
            Button::new("❌ No, Cancel", &Action::DeleteWallet),
        ]))
    }

    pub fn wallet_deleted(&self, wallet: &Wallet) -> OutboundMessage {
        OutboundMessage::markdown(format!(
            "✅ Successfully deleted wallet:\n`{}`",
            wallet.short_address()
        ))
        .with_keyboard(Keyboard::back_to(&Action::Wallets))
    }

    pub fn select_wallet_to_show(&self, wallets: &[Wallet]) -> OutboundMessage {
        let keyboard = self
            .wallet_picker(wallets, Action::ConfirmShowKey)
            .row(vec![Button::back(&Action::Wallets)]);
        OutboundMessage::plain(
            "Select a wallet to view its private key:\n\n\
             ⚠️ Warning: Never share your private key with anyone!",
        )
        .with_keyboard(keyboard)
    }

    pub fn confirm_show_key(&self, wallet: &Wallet, index: usize) -> OutboundMessage {
        OutboundMessage::markdown(format!(
            "Are you sure you want to view the private key for:\n\n`{}`?\n\n\
             ⚠️ Make sure no one is watching your screen!",
            wallet.short_address()
        ))
        .with_keyboard(Keyboard::new().row(vec![
            Button::new("✅ Yes, Show Key", &Action::ExecuteShowKey(index)),
            Button::new("❌ No, Cancel", &Action::ShowPrivateKey),
        ]))
    }

    // ---- withdrawals ----------------------------------------------------

    pub fn withdraw_menu(&self, wallets: &[Wallet]) -> OutboundMessage {
        let keyboard = self
            .wallet_picker(wallets, Action::SelectWithdrawWallet)
            .row(vec![Button::back(&Action::MainMenu)]);
        OutboundMessage::plain("🏧 Withdraw\n\nChoose a wallet to withdraw from:")
            .with_keyboard(keyboard)
    }

    pub fn withdraw_options(&self, wallet: &Wallet) -> OutboundMessage {
        OutboundMessage::plain(format!(
            "🏧 Withdraw\n\nSelected wallet: 💼 {}\n\nChoose what to withdraw:",
            wallet.short_address()
        ))
        .with_keyboard(
            Keyboard::new()
                .row(vec![
                    Button::new(format!("💰 Withdraw ${}", self.native_symbol), &Action::WithdrawNative),
                    Button::new("🪙 Withdraw Tokens", &Action::WithdrawToken),
                ])
                .row(vec![Button::back(&Action::Withdraw)]),
        )
    }

    pub fn ask_withdraw_amount(&self) -> OutboundMessage {
        OutboundMessage::markdown(format!(
            "💰 Withdraw ${sym}\n\nPlease enter the amount of ${sym} to withdraw:\n\nExample: `1.5`",
            sym = self.native_symbol
        ))
        .with_keyboard(Keyboard::back_to(&Action::Withdraw))
    }

    pub fn ask_token_address(&self) -> OutboundMessage {
        OutboundMessage::markdown(
            "🪙 Withdraw Tokens\n\nPlease enter the token contract address:\n\n\
             Example: `0x742d35Cc6634C0532925a3b844Bc454e4438f44e`",
        )
        .with_keyboard(Keyboard::back_to(&Action::Withdraw))
    }

    pub fn ask_destination(&self) -> OutboundMessage {
        OutboundMessage::plain(
            "Enter the destination address to receive the funds/tokens:\n\n\
             ⚠️ Please double-check the address before confirming!",
        )
        .with_keyboard(Keyboard::back_to(&Action::Withdraw))
    }

    pub fn ask_token_amount(&self) -> OutboundMessage {
        OutboundMessage::markdown("Enter the amount to withdraw:\n\nExample: `100`")
            .with_keyboard(Keyboard::back_to(&Action::Withdraw))
    }

    pub fn withdrawal_submitted(&self, request: &WithdrawalRequest) -> OutboundMessage {
        let text = match &request.asset {
            WithdrawAsset::Native => format!(
                "✅ Withdrawal request submitted!\n\nAmount: {} ${}\nTo: {}\n\n\
                 Transaction is being processed...",
                request.amount.normalize(),
                self.native_symbol,
                short_address(&request.destination)
            ),
            WithdrawAsset::Token(token) => format!(
                "✅ Token withdrawal request submitted!\n\nToken: {}\nAmount: {}\nTo: {}\n\n\
                 Transaction is being processed...",
                short_address(token),
                request.amount.normalize(),
                short_address(&request.destination)
            ),
        };
        OutboundMessage::plain(text).with_keyboard(Keyboard::back_to(&Action::MainMenu))
    }

    // ---- errors ---------------------------------------------------------

    /// Re-prompt after rejected free text
    pub fn input_error(&self, error: &InputError, back: &Action) -> OutboundMessage {
        self.error_with_back(error.to_string(), back)
    }

    pub fn error(&self, message: impl Into<String>, back: &Action) -> OutboundMessage {
        self.error_with_back(message, back)
    }

    // ---- orders ---------------------------------------------------------

    pub fn manage_orders(&self) -> OutboundMessage {
        OutboundMessage::plain(
            "📊 Manage Orders\n\n\
             • View your active orders\n\
             • Check your order history\n\
             • Cancel active orders\n\n\
             Select an option:",
        )
        .with_keyboard(
            Keyboard::new()
                .button("📋 Active Orders", &Action::ActiveOrders)
                .button("📜 Order History", &Action::OrderHistory)
                .button("❌ Cancel Orders", &Action::CancelOrders)
                .row(vec![Button::back(&Action::MainMenu)]),
        )
    }

    pub fn order_list(&self, list: OrderList, page: &Page<'_, Order>) -> OutboundMessage {
        let back = Keyboard::back_to(&Action::ManageOrders);
        if page.items.is_empty() {
            let text = match list {
                OrderList::Active => "You have no active orders.",
                OrderList::History => "You have no order history.",
                OrderList::Cancel => "You have no active orders to cancel.",
            };
            return OutboundMessage::plain(text).with_keyboard(back);
        }

        let header = match list {
            OrderList::Active => "📋 Active Orders\n\nSelect an order to view details:",
            OrderList::History => "📜 Order History\n\nSelect an order to view details:",
            OrderList::Cancel => "❌ Cancel Orders\n\nSelect an order to cancel:",
        };

        let mut keyboard = page
            .items
            .iter()
            .enumerate()
            .fold(Keyboard::new(), |keyboard, (k, order)| {
                let index = page.offset + k;
                let action = match list {
                    OrderList::Active => Action::ViewActiveOrder(index),
                    OrderList::History => Action::ViewHistoryOrder(index),
                    OrderList::Cancel => Action::CancelOrder(index),
                };
                keyboard.button(order.label(), &action)
            });

        let mut nav = Vec::new();
        if page.has_prev {
            nav.push(Button::new(
                "⬅️ Previous",
                &Action::OrdersPage {
                    list,
                    page: page.index - 1,
                },
            ));
        }
        if page.has_next {
            nav.push(Button::new(
                "➡️ Next",
                &Action::OrdersPage {
                    list,
                    page: page.index + 1,
                },
            ));
        }
        keyboard = keyboard.row(nav);
        keyboard.rows.extend(back.rows);

        OutboundMessage::plain(header).with_keyboard(keyboard)
    }

    pub fn order_details(&self, order: &Order, back: &Action) -> OutboundMessage {
        let mut text = format!(
            "Order #{}\n\nType: {}\nToken: {}\nAmount: {}\nPrice: {} ${}\nStatus: {}",
            order.short_id(),
            order.side,
            order.token_symbol,
            order.amount.normalize(),
            order.price.normalize(),
            self.native_symbol,
            order.status
        );
        if let Some(tx) = &order.tx_hash {
            text.push_str(&format!("\nTx: `{}`", tx));
        }

        let mut keyboard = Keyboard::new();
        if order.status.is_active() {
            keyboard = keyboard.button(
                "❌ Cancel Order",
                &Action::ConfirmCancelOrder(order.id.clone()),
            );
        }
        keyboard = keyboard.row(vec![Button::back(back)]);
        OutboundMessage::markdown(text).with_keyboard(keyboard)
    }

    pub fn order_cancelled(&self, order: &Order) -> OutboundMessage {
        OutboundMessage::plain(format!(
            "✅ Order cancellation submitted!\n\nOrder #{} is being cancelled.\n\
             This may take a few moments to process.",
            order.short_id()
        ))
        .with_keyboard(Keyboard::back_to(&Action::ManageOrders))
    }

    // ---- token screen ---------------------------------------------------

    pub fn token_loading(&self) -> OutboundMessage {
        OutboundMessage::plain("⏳ Fetching token information...")
    }

    pub fn token_error(&self) -> OutboundMessage {
        self.error_with_back(
            format!(
                "❌ Error fetching token information.\n\n\
                 This could be due to:\n\
                 • Invalid token contract\n\
                 • Contract not verified\n\
                 • Network issues\n\
                 • Token not listed on {}",
                self.exchange
            ),
            &Action::MainMenu,
        )
    }

    pub fn token_prompt(&self) -> OutboundMessage {
        self.error_with_back(
            "Send a token contract address (0x...) to view its details and trade it.",
            &Action::MainMenu,
        )
    }

    pub fn token_keyboard(&self, settings: &Settings, has_trading_wallet: bool) -> Keyboard {
        let mut keyboard = Keyboard::new().row(vec![
            Button::new("👁️ Explorer", &Action::Explorer),
            Button::new("📊 Chart", &Action::Chart),
        ]);

        if has_trading_wallet {
            keyboard = keyboard
                .row(vec![
                    Button::new("📈 Limit Order", &Action::LimitOrder),
                    Button::new("📊 Portfolio", &Action::Portfolio),
                ])
                .button("⚙️ Manage Order", &Action::ManageOrders)
                .button("💼 Select wallets", &Action::SelectTradingWallet)
                .row(vec![
                    Button::new(format!("⚡ Slippage: {}%", settings.slippage), &Action::SetSlippage),
                    Button::new(format!("⛽ Gas: {}", settings.gas_tier.gas_price()), &Action::SetGas),
                ])
                .row(vec![
                    Button::new("🛒 Buy", &Action::Buy),
                    Button::new("💰 Sell", &Action::Sell),
                ]);
        } else {
            keyboard = keyboard.button("💼 Select Wallet to Trade", &Action::SelectTradingWallet);
        }

        keyboard.row(vec![Button::back(&Action::MainMenu)])
    }

    pub fn token_report(
        &self,
        report: &TokenReport,
        settings: &Settings,
        has_trading_wallet: bool,
    ) -> OutboundMessage {
        let meta = &report.metadata;
        let liquidity_tokens = match report.reserves() {
            Some((native, token)) => format!(
                "{:.2} {} + {:.2} {}",
                native, self.native_symbol, token, meta.symbol
            ),
            None => "Unknown".to_string(),
        };
        let lp_burned = if report.lp.total_supply > 0.0 {
            format!("{:.2}%", report.lp_burned_pct())
        } else {
            "0%".to_string()
        };
        let liquidity = if report.market.liquidity.is_empty() {
            "0"
        } else {
            report.market.liquidity.as_str()
        };

        let mut text = format!(
            "🪙 {} - ${}\n\n\
             📍 Contract Address:\n`{}`\n\n\
             ⛓️ Chain: {} 💧\n\
             💱 Exchange: {}\n\n\
             💵 Price: {:.8} {}\n\
             💰 Market Cap: ${:.2}\n\
             💧 Liquidity: ${} ({})\n\
             🔥 LP Burned: {}\n\
             ⏰ Pair Age: {}\n\n",
            meta.name,
            meta.symbol,
            report.address,
            self.network_name,
            self.exchange,
            report.market.price,
            self.native_symbol,
            report.market_cap(),
            liquidity,
            liquidity_tokens,
            lp_burned,
            report.pair_age().unwrap_or_else(|| "Unknown".to_string()),
        );

        text.push_str("🔒 Security Check:\n");
        match report.capabilities {
            Some(caps) => {
                text.push_str(if caps.mintable {
                    "• ⚠️ Token is mintable!\n"
                } else {
                    "• ✅ Token is not mintable\n"
                });
                text.push_str(if caps.blacklist {
                    "• ⚠️ Can be blacklisted!\n"
                } else {
                    "• ✅ Cannot be blacklisted\n"
                });
                text.push_str(if caps.upgradeable {
                    "• ⚠️ Contract is modifiable!\n"
                } else {
                    "• ✅ Contract is not modifiable\n"
                });
            }
            None => text.push_str("• ❔ Contract code could not be checked\n"),
        }

        text.push_str("\n🌐 Social Links:\n");
        match &report.socials {
            None => text.push_str("Social links not available"),
            Some(links) if links.is_empty() => text.push_str("No social links available"),
            Some(links) => {
                let entries = [
                    ("🌐 Website", &links.website),
                    ("📱 Telegram", &links.telegram),
                    ("🐦 Twitter", &links.twitter),
                    ("💬 Discord", &links.discord),
                ];
                let lines: Vec<String> = entries
                    .iter()
                    .filter_map(|(label, link)| link.as_ref().map(|l| format!("{}: {}", label, l)))
                    .collect();
                text.push_str(&lines.join("\n"));
            }
        }

        OutboundMessage::markdown(text).with_keyboard(self.token_keyboard(settings, has_trading_wallet))
    }

    pub fn trading_wallet_picker(&self, wallets: &[WalletLine]) -> OutboundMessage {
        let keyboard = wallets
            .iter()
            .enumerate()
            .fold(Keyboard::new(), |keyboard, (i, (wallet, balance))| {
                keyboard.button(
                    format!(
                        "💼 {} ({} {})",
                        wallet.short_address(),
                        balance_text(*balance),
                        self.native_symbol
                    ),
                    &Action::SelectTradeWallet(i),
                )
            })
            .row(vec![Button::back(&Action::TokenInfo)]);
        OutboundMessage::plain("Select a wallet to trade with:").with_keyboard(keyboard)
    }

    pub fn slippage_menu(&self) -> OutboundMessage {
        let presets: Vec<Button> = SLIPPAGE_PRESETS
            .iter()
            .map(|p| Button::new(format!("{}%", p), &Action::SlippagePreset(*p)))
            .collect();
        let (first, second) = presets.split_at(3);
        let mut second = second.to_vec();
        second.push(Button::new("Custom", &Action::CustomSlippage));

        OutboundMessage::plain("Select slippage tolerance:").with_keyboard(
            Keyboard::new()
                .row(first.to_vec())
                .row(second)
                .row(vec![Button::back(&Action::TokenInfo)]),
        )
    }

    pub fn gas_menu(&self) -> OutboundMessage {
        let mut presets: Vec<Button> = GasTier::ALL
            .iter()
            .map(|tier| {
                Button::new(
                    format!("{} ({})", title_case(tier.label()), tier.gas_price()),
                    &Action::GasPreset(tier.gas_price()),
                )
            })
            .collect();
        presets.push(Button::new("Custom", &Action::CustomGas));
        let second = presets.split_off(2);

        OutboundMessage::plain("Select gas price:").with_keyboard(
            Keyboard::new()
                .row(presets)
                .row(second)
                .row(vec![Button::back(&Action::TokenInfo)]),
        )
    }

    pub fn explorer_link(&self, token: &str) -> OutboundMessage {
        OutboundMessage::plain(format!(
            "👁️ View on explorer:\n{}/token/{}",
            self.explorer_url.trim_end_matches('/'),
            token
        ))
        .with_keyboard(Keyboard::back_to(&Action::TokenInfo))
    }

    pub fn not_available(&self, feature: &str, back: &Action) -> OutboundMessage {
        self.error_with_back(format!("🚧 {} is not available yet.", feature), back)
    }

    // ---- informational --------------------------------------------------

    pub fn config(&self, settings: &Settings) -> OutboundMessage {
        OutboundMessage::plain(format!(
            "⚙️ Configuration\n\nCurrent Settings:\n\
             • Slippage: {}%\n\
             • Auto Slippage: {}\n\
             • Gas Settings: {}",
            settings.slippage,
            if settings.auto_slippage { "On" } else { "Off" },
            title_case(settings.gas_tier.label())
        ))
        .with_keyboard(Keyboard::back_to(&Action::MainMenu))
    }

    pub fn referral(&self) -> OutboundMessage {
        self.error_with_back(
            "👥 Referral Program\n\nShare your referral link to earn up to 50% of trading fees!",
            &Action::MainMenu,
        )
    }

    pub fn portfolio(&self) -> OutboundMessage {
        self.error_with_back(
            "📊 Portfolio\n\nConnect a wallet to view your portfolio.",
            &Action::MainMenu,
        )
    }

    pub fn guide(&self) -> OutboundMessage {
        self.error_with_back(
            "📖 Trading Bot Guide\n\nLearn how to use all features of the Monad Trading Bot.",
            &Action::MainMenu,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{page, OrderSide, OrderStatus, DEFAULT_PAGE_SIZE};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn orders(n: usize) -> Vec<Order> {
        (0..n)
            .map(|i| Order {
                id: format!("order-{:04}-abcdef", i),
                side: OrderSide::Buy,
                token_symbol: "SEED".to_string(),
                amount: dec!(10),
                price: dec!(0.5),
                status: OrderStatus::Open,
                tx_hash: None,
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_order_list_uses_absolute_indices() {
        let views = Views::default();
        let all = orders(12);
        let p = page(&all, 1, DEFAULT_PAGE_SIZE);
        let message = views.order_list(OrderList::Active, &p);
        let tokens = message.keyboard.unwrap();
        let tokens = tokens.tokens();

        assert_eq!(
            tokens,
            vec![
                "view_active_5",
                "view_active_6",
                "view_active_7",
                "view_active_8",
                "view_active_9",
                "view_active_page_0",
                "view_active_page_2",
                "manage_orders",
            ]
        );
    }

    #[test]
    fn test_empty_cancel_list() {
        let views = Views::default();
        let none: Vec<Order> = Vec::new();
        let message = views.order_list(OrderList::Cancel, &page(&none, 3, DEFAULT_PAGE_SIZE));
        assert_eq!(message.text, "You have no active orders to cancel.");
        assert_eq!(message.keyboard.unwrap().tokens(), vec!["manage_orders"]);
    }

    #[test]
    fn test_token_keyboard_depends_on_trading_wallet() {
        let views = Views::default();
        let settings = Settings::default();

        let without = views.token_keyboard(&settings, false);
        assert!(without.tokens().contains(&"select_trading_wallet"));
        assert!(!without.tokens().contains(&"buy_token"));

        let with = views.token_keyboard(&settings, true);
        assert!(with.tokens().contains(&"buy_token"));
        assert!(with.tokens().contains(&"set_gas"));
        let labels: Vec<&str> = with.rows.iter().flatten().map(|b| b.label.as_str()).collect();
        assert!(labels.contains(&"⚡ Slippage: 1%"));
        assert!(labels.contains(&"⛽ Gas: 750"));
    }

    #[test]
    fn test_preset_menus() {
        let views = Views::default();
        assert_eq!(
            views.slippage_menu().keyboard.unwrap().tokens(),
            vec![
                "set_slippage_0.5",
                "set_slippage_1",
                "set_slippage_2",
                "set_slippage_3",
                "set_slippage_5",
                "set_slippage_custom",
                "token_info",
            ]
        );
        assert_eq!(
            views.gas_menu().keyboard.unwrap().tokens(),
            vec!["set_gas_750", "set_gas_1000", "set_gas_1500", "set_gas_custom", "token_info"]
        );
    }

    #[test]
    fn test_disclosure_texts_mention_ttl() {
        let views = Views {
            secret_ttl: Duration::from_secs(30),
            ..Views::default()
        };
        let wallet = Wallet::generate().unwrap();
        let message = views.generated_key(&wallet, true);
        assert!(message.markdown);
        assert!(message.text.contains(wallet.private_key()));
        assert!(message.text.contains("30 seconds"));
        assert!(message.keyboard.is_none());
    }

    #[test]
    fn test_config_screen() {
        let views = Views::default();
        let text = views.config(&Settings::default()).text;
        assert!(text.contains("Slippage: 1%"));
        assert!(text.contains("Auto Slippage: Off"));
        assert!(text.contains("Gas Settings: Standard"));
    }

    #[test]
    fn test_wallet_list_balances() {
        let views = Views::default();
        let wallet = Wallet::generate().unwrap();
        let text = views
            .wallets(&[(wallet.clone(), Some(dec!(1.50))), (wallet, None)])
            .text;
        assert!(text.contains("Balance: 1.5 MON"));
        assert!(text.contains("Balance: n/a MON"));
    }
}
