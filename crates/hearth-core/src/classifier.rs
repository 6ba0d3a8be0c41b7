//! Assigns transactions to account-type buckets.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;
use uuid::Uuid;

use hearth_domain::{Account, AccountBucket, Transaction, TransactionKind};

/// Maps a free-form account type label onto its reporting bucket.
pub fn normalize_account_type(raw: &str) -> AccountBucket {
    match raw.trim().to_lowercase().as_str() {
        "checking" => AccountBucket::Checking,
        "savings" => AccountBucket::Savings,
        "credit" => AccountBucket::Credit,
        "cash" => AccountBucket::Cash,
        "investment" | "investments" => AccountBucket::Investments,
        _ => AccountBucket::Other,
    }
}

/// Money moving into and out of one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BucketFlow {
    pub earned: f64,
    pub spent: f64,
}

impl BucketFlow {
    pub fn net(&self) -> f64 {
        self.earned - self.spent
    }
}

pub type BucketFlows = BTreeMap<AccountBucket, BucketFlow>;

/// A single bucket movement produced by classifying one transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketEntry {
    pub bucket: AccountBucket,
    pub flow: BucketFlow,
}

impl BucketEntry {
    fn earned(bucket: AccountBucket, amount: f64) -> Self {
        Self {
            bucket,
            flow: BucketFlow {
                earned: amount,
                spent: 0.0,
            },
        }
    }

    fn spent(bucket: AccountBucket, amount: f64) -> Self {
        Self {
            bucket,
            flow: BucketFlow {
                earned: 0.0,
                spent: amount,
            },
        }
    }
}

pub struct TransactionClassifier {
    buckets: HashMap<Uuid, AccountBucket>,
}

impl TransactionClassifier {
    pub fn new<'a>(accounts: impl IntoIterator<Item = &'a Account>) -> Self {
        let buckets = accounts
            .into_iter()
            .map(|account| (account.id, normalize_account_type(&account.account_type)))
            .collect();
        Self { buckets }
    }

    pub fn bucket_of(&self, account_id: Uuid) -> Option<AccountBucket> {
        self.buckets.get(&account_id).copied()
    }

    /// Income and expenses land in the source bucket. Transfers between different
    /// buckets spend from the source and earn into the destination; transfers within
    /// one bucket produce nothing.
    pub fn classify(&self, txn: &Transaction) -> Vec<BucketEntry> {
        let Some(source) = self.bucket_of(txn.account_id) else {
            debug!(
                transaction_id = %txn.id,
                account_id = %txn.account_id,
                "unknown source account"
            );
            return Vec::new();
        };
        match txn.kind {
            TransactionKind::Income => vec![BucketEntry::earned(source, txn.amount)],
            TransactionKind::Expense => vec![BucketEntry::spent(source, txn.amount)],
            TransactionKind::Transfer => {
                match txn.to_account_id.and_then(|id| self.bucket_of(id)) {
                    Some(destination) if destination == source => Vec::new(),
                    Some(destination) => vec![
                        BucketEntry::spent(source, txn.amount),
                        BucketEntry::earned(destination, txn.amount),
                    ],
                    None => {
                        debug!(transaction_id = %txn.id, "transfer to untracked account");
                        vec![BucketEntry::spent(source, txn.amount)]
                    }
                }
            }
        }
    }

    pub fn accumulate<'a>(
        &self,
        transactions: impl IntoIterator<Item = &'a Transaction>,
    ) -> BucketFlows {
        let mut flows = BucketFlows::new();
        for txn in transactions {
            for entry in self.classify(txn) {
                let flow = flows.entry(entry.bucket).or_default();
                flow.earned += entry.flow.earned;
                flow.spent += entry.flow.spent;
            }
        }
        flows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    #[test]
    fn normalizes_type_labels() {
        assert_eq!(normalize_account_type("Checking"), AccountBucket::Checking);
        assert_eq!(normalize_account_type(" INVESTMENT "), AccountBucket::Investments);
        assert_eq!(normalize_account_type("investments"), AccountBucket::Investments);
        assert_eq!(normalize_account_type("crypto wallet"), AccountBucket::Other);
        assert_eq!(normalize_account_type(""), AccountBucket::Other);
    }

    #[test]
    fn transfer_between_buckets_moves_money() {
        let user = Uuid::new_v4();
        let checking = Account::new("Main", "checking", 0.0, user);
        let brokerage = Account::new("Brokerage", "Investment", 0.0, user);
        let classifier = TransactionClassifier::new([&checking, &brokerage]);

        let txn = Transaction::transfer(user, checking.id, brokerage.id, 100.0, day());
        let flows = classifier.accumulate([&txn]);

        assert_eq!(flows[&AccountBucket::Checking].spent, 100.0);
        assert_eq!(flows[&AccountBucket::Checking].earned, 0.0);
        assert_eq!(flows[&AccountBucket::Investments].earned, 100.0);
    }

    #[test]
    fn transfer_within_bucket_is_invisible() {
        let user = Uuid::new_v4();
        let a = Account::new("A", "checking", 0.0, user);
        let b = Account::new("B", "Checking", 0.0, user);
        let classifier = TransactionClassifier::new([&a, &b]);
        let txn = Transaction::transfer(user, a.id, b.id, 100.0, day());
        assert!(classifier.classify(&txn).is_empty());
        assert!(classifier.accumulate([&txn]).is_empty());
    }

    #[test]
    fn income_and_expense_use_source_bucket() {
        let user = Uuid::new_v4();
        let savings = Account::new("Rainy day", "savings", 0.0, user);
        let classifier = TransactionClassifier::new([&savings]);
        let income =
            Transaction::new(user, savings.id, TransactionKind::Income, "interest", 5.0, day());
        let expense =
            Transaction::new(user, savings.id, TransactionKind::Expense, "fee", 2.0, day());
        let flows = classifier.accumulate([&income, &expense]);
        assert_eq!(
            flows[&AccountBucket::Savings],
            BucketFlow {
                earned: 5.0,
                spent: 2.0
            }
        );
    }

    #[test]
    fn unknown_accounts_are_handled() {
        let user = Uuid::new_v4();
        let cash = Account::new("Wallet", "cash", 0.0, user);
        let classifier = TransactionClassifier::new([&cash]);
        let orphan = Transaction::new(
            user,
            Uuid::new_v4(),
            TransactionKind::Expense,
            "misc",
            9.0,
            day(),
        );
        assert!(classifier.classify(&orphan).is_empty());

        let outbound = Transaction::transfer(user, cash.id, Uuid::new_v4(), 20.0, day());
        let entries = classifier.classify(&outbound);
        assert_eq!(entries, vec![BucketEntry::spent(AccountBucket::Cash, 20.0)]);
    }
}
