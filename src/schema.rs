table! {
    appointments (id) {
        id -> Unsigned<Bigint>,
        user_id -> Nullable<Unsigned<Bigint>>,
        client_name -> Varchar,
        email -> Varchar,
        car_brand -> Varchar,
        date -> Datetime,
        time_slot -> Char,
        created_at -> Datetime,
        updated_at -> Datetime,
    }
}

table! {
    slot_locks (day, time_slot) {
        day -> Date,
        time_slot -> Char,
    }
}

table! {
    user_logins (token) {
        token -> Char,
        user_id -> Unsigned<Bigint>,
        login_time -> Datetime,
    }
}

table! {
    users (id) {
        id -> Unsigned<Bigint>,
        email -> Varchar,
        password -> Char,
        name -> Varchar,
        role -> Varchar,
        created_at -> Datetime,
    }
}

joinable!(user_logins -> users (user_id));

allow_tables_to_appear_in_same_query!(appointments, slot_locks, user_logins, users,);
