use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use spl_token::solana_program::program_option::COption;
use spl_token::solana_program::program_pack::Pack;

use super::{AccountSource, BlockhashWindow, ConfirmationStatus, GatewayError, TransactionGateway};

const VALID_WINDOW: u64 = 150;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CallCounts {
    pub account_fetches: usize,
    pub blockhash: usize,
    pub send: usize,
    pub status: usize,
    pub block_height: usize,
}

/// 脚本化的内存链：按队列返回预设结果，队列耗尽后走默认值。
pub(crate) struct MockChain {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    calls: Mutex<CallCounts>,
    blockhash_failures: Mutex<VecDeque<GatewayError>>,
    send_script: Mutex<VecDeque<Result<(), GatewayError>>>,
    status_script: Mutex<VecDeque<ConfirmationStatus>>,
    default_status: Mutex<ConfirmationStatus>,
    height: Mutex<u64>,
    height_step: Mutex<u64>,
    height_script: Mutex<VecDeque<Result<(), GatewayError>>>,
    height_failure: Mutex<Option<GatewayError>>,
    sent: Mutex<Vec<VersionedTransaction>>,
    sent_skip_preflight: Mutex<Vec<bool>>,
}

impl MockChain {
    pub(crate) fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            calls: Mutex::new(CallCounts::default()),
            blockhash_failures: Mutex::new(VecDeque::new()),
            send_script: Mutex::new(VecDeque::new()),
            status_script: Mutex::new(VecDeque::new()),
            default_status: Mutex::new(ConfirmationStatus::Confirmed),
            height: Mutex::new(1_000),
            height_step: Mutex::new(1),
            height_script: Mutex::new(VecDeque::new()),
            height_failure: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            sent_skip_preflight: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn insert_account(&self, address: Pubkey, account: Account) {
        self.accounts.lock().insert(address, account);
    }

    pub(crate) fn fail_blockhash(&self, err: GatewayError) {
        self.blockhash_failures.lock().push_back(err);
    }

    pub(crate) fn script_send(&self, result: Result<(), GatewayError>) {
        self.send_script.lock().push_back(result);
    }

    pub(crate) fn script_status(&self, status: ConfirmationStatus) {
        self.status_script.lock().push_back(status);
    }

    pub(crate) fn set_default_status(&self, status: ConfirmationStatus) {
        *self.default_status.lock() = status;
    }

    pub(crate) fn set_height_step(&self, step: u64) {
        *self.height_step.lock() = step;
    }

    /// 队列中的 `Ok` 表示正常推进高度。
    pub(crate) fn script_block_height(&self, result: Result<(), GatewayError>) {
        self.height_script.lock().push_back(result);
    }

    /// 队列耗尽后每次读取区块高度都返回该错误。
    pub(crate) fn fail_block_height(&self, err: GatewayError) {
        *self.height_failure.lock() = Some(err);
    }

    pub(crate) fn calls(&self) -> CallCounts {
        *self.calls.lock()
    }

    pub(crate) fn sent(&self) -> Vec<VersionedTransaction> {
        self.sent.lock().clone()
    }

    /// 每次发送时的 skip_preflight 取值，与 `sent()` 顺序一致。
    pub(crate) fn sent_skip_preflight(&self) -> Vec<bool> {
        self.sent_skip_preflight.lock().clone()
    }
}

#[async_trait]
impl AccountSource for MockChain {
    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<Account>, GatewayError> {
        self.calls.lock().account_fetches += 1;
        Ok(self.accounts.lock().get(address).cloned())
    }
}

#[async_trait]
impl TransactionGateway for MockChain {
    async fn latest_blockhash(&self) -> Result<BlockhashWindow, GatewayError> {
        self.calls.lock().blockhash += 1;
        if let Some(err) = self.blockhash_failures.lock().pop_front() {
            return Err(err);
        }
        Ok(BlockhashWindow {
            blockhash: Hash::new_unique(),
            last_valid_block_height: *self.height.lock() + VALID_WINDOW,
        })
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        skip_preflight: bool,
    ) -> Result<Signature, GatewayError> {
        self.calls.lock().send += 1;
        self.sent.lock().push(transaction.clone());
        self.sent_skip_preflight.lock().push(skip_preflight);
        if let Some(Err(err)) = self.send_script.lock().pop_front() {
            return Err(err);
        }
        Ok(transaction.signatures[0])
    }

    async fn signature_status(
        &self,
        _signature: &Signature,
    ) -> Result<ConfirmationStatus, GatewayError> {
        self.calls.lock().status += 1;
        if let Some(status) = self.status_script.lock().pop_front() {
            return Ok(status);
        }
        Ok(self.default_status.lock().clone())
    }

    async fn block_height(&self) -> Result<u64, GatewayError> {
        self.calls.lock().block_height += 1;
        match self.height_script.lock().pop_front() {
            Some(Err(err)) => return Err(err),
            Some(Ok(())) => {}
            None => {
                if let Some(err) = self.height_failure.lock().clone() {
                    return Err(err);
                }
            }
        }
        let step = *self.height_step.lock();
        let mut height = self.height.lock();
        *height += step;
        Ok(*height)
    }
}

pub(crate) fn token_account(mint: &Pubkey, owner: &Pubkey, amount: u64) -> Account {
    let state = spl_token::state::Account {
        mint: *mint,
        owner: *owner,
        amount,
        delegate: COption::None,
        state: spl_token::state::AccountState::Initialized,
        is_native: COption::None,
        delegated_amount: 0,
        close_authority: COption::None,
    };
    let mut data = vec![0u8; spl_token::state::Account::LEN];
    spl_token::state::Account::pack(state, &mut data).expect("pack token account");
    Account {
        lamports: 2_039_280,
        data,
        owner: spl_token::ID,
        executable: false,
        rent_epoch: 0,
    }
}
